//! Per-user bounded conversation history.
//!
//! History lives for the lifetime of the process only. Each user's log is
//! capped at `2 × max_exchanges` turns; older turns are dropped from the
//! front so the remainder stays in chronological order and starts on a
//! user turn.

use std::collections::HashMap;
use std::sync::Mutex;

use switchboard_core::config::ConversationConfig;
use switchboard_core::{ConversationTurn, Role};

use crate::error::ChatError;

/// Conversation memory keyed by user id.
pub struct ConversationStore {
    max_exchanges: usize,
    command_marker: String,
    histories: Mutex<HashMap<String, Vec<ConversationTurn>>>,
}

impl ConversationStore {
    /// Create a store bounded to `max_exchanges` exchanges per user.
    pub fn new(max_exchanges: usize, command_marker: impl Into<String>) -> Self {
        Self {
            max_exchanges,
            command_marker: command_marker.into(),
            histories: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store from the `[conversation]` config section.
    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(config.max_exchanges, config.command_marker.clone())
    }

    /// Upper bound on stored turns per user.
    pub fn max_turns(&self) -> usize {
        self.max_exchanges.saturating_mul(2)
    }

    /// Prefix that marks input as a command.
    pub fn command_marker(&self) -> &str {
        &self.command_marker
    }

    /// Whether `content` from a user would be filtered as a command.
    pub fn is_command(&self, content: &str) -> bool {
        !self.command_marker.is_empty() && content.starts_with(&self.command_marker)
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<ConversationTurn>>>, ChatError> {
        self.histories
            .lock()
            .map_err(|e| ChatError::StorageError(format!("history lock poisoned: {}", e)))
    }

    /// Snapshot of a user's history, creating an empty one on first access.
    pub fn get(&self, user_id: &str) -> Result<Vec<ConversationTurn>, ChatError> {
        let mut histories = self.lock()?;
        Ok(histories.entry(user_id.to_string()).or_default().clone())
    }

    /// Append one turn. Returns `false` when the turn was filtered as a
    /// command.
    pub fn append(&self, user_id: &str, role: Role, content: &str) -> Result<bool, ChatError> {
        if role == Role::User && self.is_command(content) {
            tracing::debug!(user_id = %user_id, "skipping command input for history");
            return Ok(false);
        }
        let max_turns = self.max_turns();
        let mut histories = self.lock()?;
        let history = histories.entry(user_id.to_string()).or_default();
        history.push(turn(role, content));
        trim(history, max_turns);
        Ok(true)
    }

    /// Append a user turn and its assistant reply under one lock.
    ///
    /// Nothing is appended when the user content is a command.
    pub fn append_exchange(
        &self,
        user_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> Result<bool, ChatError> {
        if self.is_command(user_content) {
            return Ok(false);
        }
        let max_turns = self.max_turns();
        let mut histories = self.lock()?;
        let history = histories.entry(user_id.to_string()).or_default();
        history.push(ConversationTurn::user(user_content));
        history.push(ConversationTurn::assistant(assistant_content));
        trim(history, max_turns);
        Ok(true)
    }

    /// Clear a user's history.
    pub fn reset(&self, user_id: &str) -> Result<(), ChatError> {
        let mut histories = self.lock()?;
        histories.insert(user_id.to_string(), Vec::new());
        tracing::info!(user_id = %user_id, "conversation history reset");
        Ok(())
    }

    /// Number of turns stored for `user_id`.
    pub fn len(&self, user_id: &str) -> Result<usize, ChatError> {
        let histories = self.lock()?;
        Ok(histories.get(user_id).map_or(0, Vec::len))
    }

    /// Number of users with a non-empty history.
    pub fn active_conversations(&self) -> Result<usize, ChatError> {
        let histories = self.lock()?;
        Ok(histories.values().filter(|h| !h.is_empty()).count())
    }
}

fn turn(role: Role, content: &str) -> ConversationTurn {
    match role {
        Role::System => ConversationTurn::system(content),
        Role::User => ConversationTurn::user(content),
        Role::Assistant => ConversationTurn::assistant(content),
        Role::Tool => ConversationTurn {
            role: Role::Tool,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        },
    }
}

/// Drop the oldest turns until at most `max_turns` remain, then drop any
/// leading turns that are not user turns so no reply is left unpaired.
fn trim(history: &mut Vec<ConversationTurn>, max_turns: usize) {
    if history.len() <= max_turns {
        return;
    }
    let excess = history.len() - max_turns;
    history.drain(..excess);
    let orphaned = history
        .iter()
        .take_while(|t| t.role != Role::User)
        .count();
    history.drain(..orphaned);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConversationStore {
        ConversationStore::new(2, "/")
    }

    #[test]
    fn test_get_creates_empty() {
        let s = store();
        assert!(s.get("alice").unwrap().is_empty());
        assert_eq!(s.len("alice").unwrap(), 0);
    }

    #[test]
    fn test_append_preserves_order() {
        let s = store();
        s.append("alice", Role::User, "hi").unwrap();
        s.append("alice", Role::Assistant, "hello").unwrap();
        let h = s.get("alice").unwrap();
        assert_eq!(h[0], ConversationTurn::user("hi"));
        assert_eq!(h[1], ConversationTurn::assistant("hello"));
    }

    #[test]
    fn test_command_never_appended() {
        let s = store();
        assert!(!s.append("alice", Role::User, "/reset").unwrap());
        assert_eq!(s.len("alice").unwrap(), 0);
        assert!(!s.append_exchange("alice", "/start", "Hi!").unwrap());
        assert_eq!(s.len("alice").unwrap(), 0);
    }

    #[test]
    fn test_assistant_content_starting_with_marker_is_kept() {
        let s = store();
        assert!(s.append("alice", Role::Assistant, "/help lists commands").unwrap());
        assert_eq!(s.len("alice").unwrap(), 1);
    }

    #[test]
    fn test_bound_holds_after_many_appends() {
        let s = store();
        for i in 0..25 {
            s.append_exchange("alice", &format!("q{i}"), &format!("a{i}"))
                .unwrap();
            assert!(s.len("alice").unwrap() <= s.max_turns());
        }
        let h = s.get("alice").unwrap();
        assert_eq!(h.len(), 4);
        assert_eq!(h[0].content_str(), "q23");
        assert_eq!(h[1].content_str(), "a23");
        assert_eq!(h[2].content_str(), "q24");
        assert_eq!(h[3].content_str(), "a24");
    }

    #[test]
    fn test_bound_holds_for_single_appends() {
        let s = store();
        for i in 0..11 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            s.append("alice", role, &format!("m{i}")).unwrap();
            assert!(s.len("alice").unwrap() <= s.max_turns());
        }
        let h = s.get("alice").unwrap();
        assert_eq!(h.first().map(|t| t.role), Some(Role::User));
    }

    #[test]
    fn test_trim_never_leaves_leading_reply() {
        let s = store();
        s.append("alice", Role::User, "q0").unwrap();
        s.append("alice", Role::Assistant, "a0").unwrap();
        s.append("alice", Role::User, "q1").unwrap();
        s.append("alice", Role::Assistant, "a1").unwrap();
        // Unpaired extra reply pushes the log over the bound.
        s.append("alice", Role::Assistant, "a1b").unwrap();
        let h = s.get("alice").unwrap();
        assert_eq!(h[0].role, Role::User);
        assert_eq!(h[0].content_str(), "q1");
    }

    #[test]
    fn test_reset_clears_only_that_user() {
        let s = store();
        s.append_exchange("alice", "q", "a").unwrap();
        s.append_exchange("bob", "q", "a").unwrap();
        s.reset("alice").unwrap();
        assert_eq!(s.len("alice").unwrap(), 0);
        assert_eq!(s.len("bob").unwrap(), 2);
        assert_eq!(s.active_conversations().unwrap(), 1);
    }

    #[test]
    fn test_empty_marker_disables_filtering() {
        let s = ConversationStore::new(10, "");
        assert!(s.append("alice", Role::User, "/reset").unwrap());
    }

    #[test]
    fn test_from_config_defaults() {
        let s = ConversationStore::from_config(&ConversationConfig::default());
        assert_eq!(s.max_turns(), 20);
        assert_eq!(s.command_marker(), "/");
    }
}
