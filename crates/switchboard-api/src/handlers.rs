//! Route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use switchboard_core::{InboundEvent, RouteDecision};

use crate::dispatch::process_update;
use crate::error::ApiError;
use crate::state::AppState;
use crate::telegram::Update;

// =============================================================================
// Health
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// RFC 3339 start time.
    pub started_at: String,
    pub active_conversations: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let active_conversations = state
        .coordinator
        .store()
        .active_conversations()
        .map_err(ApiError::from)?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
        active_conversations,
    }))
}

// =============================================================================
// Telegram webhook
// =============================================================================

/// POST {webhook_path}
///
/// Acknowledges at once and answers in a background task. A slow tool
/// round trip would otherwise outlast Telegram's delivery timeout and the
/// update would be redelivered.
pub async fn webhook(State(state): State<AppState>, Json(update): Json<Update>) -> StatusCode {
    let update_id = update.update_id;
    tokio::spawn(async move {
        if let Err(e) = process_update(&state, update).await {
            tracing::warn!(update_id, error = %e, "failed to deliver webhook reply");
        }
    });
    StatusCode::OK
}

// =============================================================================
// Direct chat
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteDecision>,
    #[serde(default)]
    pub tools_used: Vec<String>,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let event = InboundEvent::from_text(req.user_id, req.text, state.command_marker());
    let result = state
        .coordinator
        .handle_detailed(&event.user_id, &event.text, event.is_command)
        .await;

    Ok(Json(ChatResponse {
        reply: result.content,
        route: result.route,
        tools_used: result.tools_used,
    }))
}
