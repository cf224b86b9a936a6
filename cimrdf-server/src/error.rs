//! Server error types with HTTP status code mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Server error type with HTTP status mapping
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed request body or envelope
    #[error("{0}")]
    BadRequest(String),

    /// JSON parsing error
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Server-side failure (e.g. result serialization)
    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ServerError::BadRequest(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ServerError::Internal(msg.into())
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) | ServerError::Json(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// HTTP status code
    pub status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            status: status.as_u16(),
        };
        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            format!(r#"{{"error":"{}","status":{}}}"#, self, status.as_u16())
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;
