//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping engine errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use logistics_nlu_lib::LogisticsNluError;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 500 Internal Server Error - unexpected engine failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<failure::Error> for ApiError {
    fn from(err: failure::Error) -> Self {
        match err.downcast_ref::<LogisticsNluError>() {
            Some(LogisticsNluError::EmptyQuery) => {
                ApiError::BadRequest("Query text cannot be empty".to_string())
            }
            Some(LogisticsNluError::UnknownIntent(intent)) => {
                ApiError::BadRequest(format!("Unknown intent: '{}'", intent))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
