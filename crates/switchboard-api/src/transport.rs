//! Outbound chat transport.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TransportError;

/// Sends text to a chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError>;
}

/// Transport that records every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// `(chat_id, text)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .map_err(|e| TransportError::Connection(format!("recorder lock poisoned: {e}")))?
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_transport_keeps_order() {
        let t = RecordingTransport::new();
        t.send_text("1", "first").await.unwrap();
        t.send_text("2", "second").await.unwrap();
        assert_eq!(
            t.sent(),
            vec![
                ("1".to_string(), "first".to_string()),
                ("2".to_string(), "second".to_string())
            ]
        );
    }
}
