use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use database::error::ServiceError;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON error body returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// A domain error carried to the HTTP boundary
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::BadRequest(_) | ServiceError::UnsupportedState(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage failures stay out of the response body
        if let ServiceError::Database(db_err) = &err {
            log::error!("database error: {db_err}");
            return Self {
                status,
                message: "internal server error".to_string(),
            };
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ServiceError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::warn!("{} {}", self.status.as_u16(), self.message);
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::NotFound("booking x not found".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::BadRequest("already decided".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::UnsupportedState("Unknown state: FOO".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Conflict("email already in use".to_string()),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, expected);
        }
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorResponse {
            error: "Unknown state: FOO".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Unknown state: FOO" }));
    }

    #[test]
    fn test_database_details_are_not_leaked() {
        let api: ApiError =
            ServiceError::Database(sea_orm::DbErr::Custom("secret dsn".to_string())).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "internal server error");
    }
}
