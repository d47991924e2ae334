//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use switchboard_chat::QueryCoordinator;
use switchboard_core::config::ServerConfig;

use crate::transport::ChatTransport;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Routes every inbound message.
    pub coordinator: Arc<QueryCoordinator>,
    /// Delivers replies for webhook and polling updates.
    pub transport: Arc<dyn ChatTransport>,
    /// HTTP surface settings (webhook path, secret, rate limit).
    pub server: Arc<ServerConfig>,
    /// Monotonic start time for uptime calculation.
    pub start_time: Instant,
    /// Wall-clock start time reported by `/health`.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new `AppState`, stamping the start time.
    pub fn new(
        coordinator: Arc<QueryCoordinator>,
        transport: Arc<dyn ChatTransport>,
        server: ServerConfig,
    ) -> Self {
        Self {
            coordinator,
            transport,
            server: Arc::new(server),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Prefix that marks a message as a command.
    pub fn command_marker(&self) -> &str {
        self.coordinator.store().command_marker()
    }
}
