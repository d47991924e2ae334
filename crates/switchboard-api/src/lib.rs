//! HTTP surface and Telegram transport.
//!
//! Serves the webhook, `/chat` and `/health` routes, and provides the
//! long-polling loop for deployments without a public URL.

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod polling;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod telegram;
pub mod transport;

pub use dispatch::process_update;
pub use error::{ApiError, TransportError};
pub use polling::{Poller, UpdateSource};
pub use routes::{create_router, start_server};
pub use state::AppState;
pub use telegram::{TelegramClient, Update};
pub use transport::{ChatTransport, RecordingTransport};
