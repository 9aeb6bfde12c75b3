use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// Caller identity, supplied by the trusted gateway in the
/// X-Sharer-User-Id header
#[derive(Debug, Clone, Copy)]
pub struct SharerId(pub Uuid);

impl<S> FromRequestParts<S> for SharerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::bad_request("missing X-Sharer-User-Id header"))?;

        let user_id = value
            .to_str()
            .ok()
            .and_then(|raw| raw.parse::<Uuid>().ok())
            .ok_or_else(|| ApiError::bad_request("invalid X-Sharer-User-Id header"))?;

        Ok(Self(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_parses_valid_header() {
        let user_id = Uuid::new_v4();
        let (mut parts, _) = Request::builder()
            .header(USER_ID_HEADER, user_id.to_string())
            .body(())
            .unwrap()
            .into_parts();

        let SharerId(parsed) = SharerId::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(parsed, user_id);
    }

    #[tokio::test]
    async fn test_rejects_missing_header() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(SharerId::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_malformed_header() {
        let (mut parts, _) = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap()
            .into_parts();
        assert!(SharerId::from_request_parts(&mut parts, &()).await.is_err());
    }
}
