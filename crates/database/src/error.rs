use sea_orm::DbErr;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Domain error for the service layer. Every precondition failure aborts
/// the operation before any write happens; the HTTP boundary maps each
/// variant to a status code.
#[derive(Debug)]
pub enum ServiceError {
    /// The referenced entity does not exist, or the caller has no right to
    /// see it (access denial is indistinguishable from nonexistence).
    NotFound(String),
    /// A domain rule was violated: invalid time range, unavailable item,
    /// already-decided booking.
    BadRequest(String),
    /// The caller supplied a state filter outside the closed enumeration.
    UnsupportedState(String),
    /// A uniqueness constraint was violated (duplicate user email).
    Conflict(String),
    Database(DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NotFound(msg) => write!(f, "{msg}"),
            Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::UnsupportedState(msg) => write!(f, "{msg}"),
            Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_passes_domain_message_through() {
        let err = ServiceError::BadRequest("item not available".to_string());
        assert_eq!(err.to_string(), "item not available");
    }

    #[test]
    fn test_db_error_conversion() {
        let err: ServiceError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
