//! Turns a Telegram update into a reply on the transport.
//!
//! Shared by the webhook handler and the polling loop.

use crate::error::TransportError;
use crate::state::AppState;
use crate::telegram::{classify_update, Inbound, Update, UNSUPPORTED_REPLY};

/// Answer one update. Transport failures are returned to the caller,
/// which decides whether they matter.
pub async fn process_update(state: &AppState, update: Update) -> Result<(), TransportError> {
    match classify_update(&update, state.command_marker()) {
        Inbound::Text(event) => {
            tracing::debug!(
                update_id = update.update_id,
                chat_id = %event.user_id,
                is_command = event.is_command,
                "processing text update"
            );
            let reply = state.coordinator.handle_event(&event).await;
            state.transport.send_text(&event.user_id, &reply).await
        }
        Inbound::Unsupported { chat_id, kind } => {
            tracing::info!(update_id = update.update_id, chat_id = %chat_id, kind, "unsupported message type");
            state.transport.send_text(&chat_id, UNSUPPORTED_REPLY).await
        }
        Inbound::Ignored => {
            tracing::debug!(update_id = update.update_id, "update ignored");
            Ok(())
        }
    }
}
