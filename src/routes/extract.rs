use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;

use crate::error::AppError;

/// The only media type accepted on body-bearing writes
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// JSON request body guarded by an exact `Content-Type: application/json` check
///
/// The header is inspected before the body is read, so a missing or foreign
/// content type yields 415 regardless of what the body holds. Malformed JSON
/// yields 400. Field-level validation is left to the model.
#[derive(Debug)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());

        if content_type != Some(JSON_CONTENT_TYPE) {
            tracing::debug!(content_type = ?content_type, "Rejecting request body media type");
            return Err(AppError::UnsupportedMediaType(format!(
                "Content-Type must be {}",
                JSON_CONTENT_TYPE
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::DataValidation(rejection.body_text()))?;

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::DataValidation(format!(
                "Invalid Recommendation: body of request contained bad or no data ({})",
                e
            ))
        })?;

        Ok(Self(value))
    }
}
