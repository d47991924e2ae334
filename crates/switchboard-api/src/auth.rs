//! Webhook authentication.
//!
//! Telegram echoes the `secret_token` given to `setWebhook` in the
//! `X-Telegram-Bot-Api-Secret-Token` header of every delivery. When a
//! secret is configured, deliveries without a matching header are rejected.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the webhook secret.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}

/// Middleware that checks the webhook secret header.
///
/// Passes everything through when no secret is configured.
pub async fn require_webhook_secret(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.server.webhook_secret.as_deref() else {
        return next.run(req).await;
    };

    match req.headers().get(SECRET_HEADER) {
        Some(value) => match value.to_str() {
            Ok(token) if token == expected => next.run(req).await,
            Ok(_) => {
                tracing::warn!("webhook delivery with wrong secret token");
                unauthorized("Invalid secret token")
            }
            Err(_) => unauthorized("Invalid secret token encoding"),
        },
        None => unauthorized("Missing secret token"),
    }
}
