use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Temporal/status bucket used when listing bookings. A closed set: any
/// other spelling fails to parse and the offending value is kept for the
/// error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateFilter {
    All,
    /// start < now < end
    Current,
    /// end < now
    Past,
    /// start > now
    Future,
    Waiting,
    Rejected,
}

impl Display for StateFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Current => write!(f, "CURRENT"),
            Self::Past => write!(f, "PAST"),
            Self::Future => write!(f, "FUTURE"),
            Self::Waiting => write!(f, "WAITING"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Carries the rejected input so callers can surface "Unknown state: {value}".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedStateError(pub String);

impl Display for UnsupportedStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Unknown state: {}", self.0)
    }
}

impl std::error::Error for UnsupportedStateError {}

impl FromStr for StateFilter {
    type Err = UnsupportedStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "PAST" => Ok(Self::Past),
            "FUTURE" => Ok(Self::Future),
            "WAITING" => Ok(Self::Waiting),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(UnsupportedStateError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_variants() {
        for (input, expected) in [
            ("ALL", StateFilter::All),
            ("CURRENT", StateFilter::Current),
            ("PAST", StateFilter::Past),
            ("FUTURE", StateFilter::Future),
            ("WAITING", StateFilter::Waiting),
            ("REJECTED", StateFilter::Rejected),
        ] {
            assert_eq!(input.parse(), Ok(expected));
        }
    }

    #[test]
    fn test_unknown_state_names_offending_value() {
        let err = "UNSUPPORTED_STATUS".parse::<StateFilter>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown state: UNSUPPORTED_STATUS");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("all".parse::<StateFilter>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for state in [
            StateFilter::All,
            StateFilter::Current,
            StateFilter::Past,
            StateFilter::Future,
            StateFilter::Waiting,
            StateFilter::Rejected,
        ] {
            assert_eq!(state.to_string().parse(), Ok(state));
        }
    }
}
