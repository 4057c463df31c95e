//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every failure body has the
//! `{success: false, message}` shape the unsubscribe page script expects.
//!
//! # Key invariants and assumptions
//! - `success` is always `false` in an error body.
//! - Internal errors log details server-side and return the caller-supplied
//!   message only.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use unsubscribe::api::error::api_validation_error;
///
/// let err = api_validation_error("missing email");
/// assert_eq!(err.status, StatusCode::BAD_REQUEST);
/// assert!(!err.body.success);
/// ```
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

/// Build a 400 Bad Request for missing or malformed client input.
pub fn api_validation_error(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorResponse {
            success: false,
            message: message.to_string(),
        },
    }
}

/// Build a 500 Internal Server Error from a store error.
///
/// # What it does
/// Logs the store error and returns a generic internal error response.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "unsubscribe storage error");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            success: false,
            message: message.to_string(),
        },
    }
}
