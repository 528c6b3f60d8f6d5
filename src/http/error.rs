//! Structured error responses.
//!
//! # Responsibilities
//! - Render the uniform error body for filter-chain failures
//! - Map authentication error kinds to gateway error codes
//!
//! # Design Decisions
//! - Body shape is fixed: `{"errorCode": <int>, "message": "<string>"}`
//! - Every filter-chain failure renders as 401 Unauthorized
//! - Failure to serialize the body is fatal; there is no further fallback

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// The only serialized shape crossing the boundary on auth failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: i32,
    pub message: String,
}

/// Render the structured 401 error body.
///
/// Panics if the body cannot be serialized; that is an unrecoverable
/// processing error with no fallback.
pub fn error_response(error_code: i32, message: &str) -> Response {
    let body = ErrorResponse {
        error_code,
        message: message.to_string(),
    };
    let payload = serde_json::to_vec(&body).expect("error body serialization failed");

    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .expect("error response construction failed")
}

/// Render an authentication failure.
pub fn auth_error_response(err: &AuthError) -> Response {
    error_response(err.error_code(), &err.to_string())
}
