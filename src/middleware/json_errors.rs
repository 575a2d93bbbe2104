use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Gives routing-level 405 responses the same JSON body as application errors.
///
/// Only bodies the router produced itself (no content type) are rewritten; the
/// `Allow` header is carried over.
pub async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut rewritten = AppError::MethodNotAllowed(
        "405 Method Not Allowed: The method is not allowed for the requested URL.".to_string(),
    )
    .into_response();

    if let Some(allow) = allow {
        rewritten.headers_mut().insert(header::ALLOW, allow);
    }
    rewritten
}
