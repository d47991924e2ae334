//! API and transport error types.
//!
//! `ApiError` renders a consistent JSON error body for the HTTP surface;
//! `TransportError` covers calls out to the Telegram Bot API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
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
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 Bad Request.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// 500 Internal Server Error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<switchboard_chat::ChatError> for ApiError {
    fn from(err: switchboard_chat::ChatError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Errors from the chat transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    /// The Bot API answered `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api { code: u16, description: String },
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("config error: {0}")]
    Config(String),
}

impl TransportError {
    /// Whether Telegram rejected the message markup.
    pub fn is_markup_rejected(&self) -> bool {
        matches!(
            self,
            TransportError::Api { code: 400, description }
                if description.to_lowercase().contains("can't parse entities")
        )
    }
}
