//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every endpoint fails
//! with the same `{"error": "..."}` shape and the matching status code.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Structured API error returned by handlers: an HTTP status coupled with a
/// JSON error body. Implements `IntoResponse` so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            error: message.to_string(),
        },
    }
}

/// 401 Unauthorized: missing or rejected credential.
pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, message)
}

/// 404 Not Found: the character (or a required field of it) is absent.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, message)
}

/// 500 Internal Server Error from a store failure.
///
/// Logs the store error server-side for debugging; the client gets the
/// generic message only.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "character storage error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// 500 Internal Server Error without an underlying store error.
pub fn api_internal_message(message: &str) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Map a store failure for an operation where absence is a 404.
pub fn store_error(message: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(what) => api_not_found(&what),
        other => api_internal(message, &other),
    }
}
