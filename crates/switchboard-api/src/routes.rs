//! Router construction and server startup.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Extension, Router};
use switchboard_core::SwitchboardError;
use tower_http::trace::TraceLayer;

use crate::auth::require_webhook_secret;
use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the router: `/health`, the webhook path, and `/chat`.
pub fn create_router(state: AppState) -> Router {
    let limiter = RateLimiter::new(state.server.max_requests_per_sec);
    let webhook_path = state.server.webhook_path.clone();

    let webhook = Router::new()
        .route(&webhook_path, post(handlers::webhook))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_webhook_secret,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .merge(webhook)
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(limiter))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `server.host:server.port` and serve until the process exits.
pub async fn start_server(state: AppState) -> Result<(), SwitchboardError> {
    let addr = format!("{}:{}", state.server.host, state.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SwitchboardError::Api(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| SwitchboardError::Api(format!("Server error: {e}")))?;

    Ok(())
}
