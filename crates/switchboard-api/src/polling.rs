//! Long-polling update loop.
//!
//! Used when no public webhook URL is available. Updates are fetched with
//! `getUpdates` and answered one at a time, in delivery order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::dispatch::process_update;
use crate::error::TransportError;
use crate::state::AppState;
use crate::telegram::Update;

/// Wait after a failed fetch before retrying.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Source of pending updates.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout_secs: u64)
        -> Result<Vec<Update>, TransportError>;
}

/// Polls an [`UpdateSource`] and answers what it returns.
pub struct Poller {
    source: Arc<dyn UpdateSource>,
    state: AppState,
    offset: i64,
    poll_timeout_secs: u64,
    backoff: Duration,
}

impl Poller {
    /// Create a poller starting at offset 0 with the default backoff.
    pub fn new(source: Arc<dyn UpdateSource>, state: AppState, poll_timeout_secs: u64) -> Self {
        Self {
            source,
            state,
            offset: 0,
            poll_timeout_secs,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Override the wait after a failed fetch.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Next `update_id` to ask for.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Fetch one batch and answer every update in it.
    ///
    /// Returns the number of updates seen. The offset advances past each
    /// update even when its reply fails to send, so nothing is redelivered.
    pub async fn poll_once(&mut self) -> Result<usize, TransportError> {
        let updates = self
            .source
            .get_updates(self.offset, self.poll_timeout_secs)
            .await?;
        let count = updates.len();

        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            let update_id = update.update_id;
            if let Err(e) = process_update(&self.state, update).await {
                tracing::warn!(update_id, error = %e, "failed to deliver reply");
            }
        }
        Ok(count)
    }

    /// Poll until the task is dropped.
    pub async fn run(mut self) {
        tracing::info!(timeout_secs = self.poll_timeout_secs, "polling for updates");
        loop {
            match self.poll_once().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(count = n, offset = self.offset, "batch handled"),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backoff_secs = self.backoff.as_secs(),
                        "getUpdates failed, backing off"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}
