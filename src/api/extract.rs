use crate::types::AppError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor whose rejection is an [`AppError`].
///
/// Bodies that are not JSON, or that do not match `T`, answer 400 with the
/// usual JSON error shape instead of axum's plain-text 415/422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "rejected request body");
            AppError::InvalidInput("invalid request body".to_string())
        })?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoginRequest;
    use axum::{body::Body, http::header};

    fn request(content_type: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let ApiJson(login) =
            ApiJson::<LoginRequest>::from_request(request("application/json", "{}"), &())
                .await
                .unwrap();

        assert_eq!(login.identifier, "");
        assert_eq!(login.password, "");
    }

    #[tokio::test]
    async fn test_bad_bodies_are_invalid_input() {
        for (content_type, body) in [
            ("text/plain", "not json"),
            ("application/json", "{not json"),
            ("application/json", "[1, 2]"),
        ] {
            let rejection =
                ApiJson::<LoginRequest>::from_request(request(content_type, body), &())
                    .await
                    .unwrap_err();
            assert!(
                matches!(rejection, AppError::InvalidInput(_)),
                "{} {:?}",
                content_type,
                body
            );
        }
    }
}
