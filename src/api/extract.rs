//! Request body extraction accepting JSON or URL-encoded forms.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Body deserialized from `application/json` or
/// `application/x-www-form-urlencoded`. Any other (or missing) content type
/// is read as an empty form, so absent fields surface as validation errors.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::MalformedBody(e.body_text()))?;

        decode(&content_type, &body).map(Payload)
    }
}

fn decode<T: DeserializeOwned>(content_type: &str, body: &[u8]) -> Result<T, ApiError> {
    if content_type.starts_with("application/json") {
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        serde_urlencoded::from_bytes(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
    } else {
        serde_urlencoded::from_bytes(b"").map_err(|e| ApiError::MalformedBody(e.to_string()))
    }
}
