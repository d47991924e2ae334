//! Direct (no-tool) replies.

use std::sync::Arc;
use std::time::Duration;

use switchboard_core::ConversationTurn;
use switchboard_providers::{CompletionProvider, CompletionRequest, SamplingParams};

use crate::call::complete_within;
use crate::error::ChatError;
use crate::orchestrator::NO_RESPONSE;
use crate::prompts::GENERAL_SYSTEM_PROMPT;

/// Answers with a single completion call and no tool descriptors.
pub struct DirectResponder {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    sampling: SamplingParams,
    timeout: Duration,
}

impl DirectResponder {
    /// Create a new `DirectResponder` for `model`.
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            sampling: SamplingParams::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the completion deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Answer `query` in one completion call, with `history` as context.
    pub async fn respond(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationTurn::system(GENERAL_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ConversationTurn::user(query));

        let request =
            CompletionRequest::new(self.model.clone(), messages).with_sampling(self.sampling);
        let completion = complete_within(self.provider.as_ref(), request, self.timeout)
            .await
            .map_err(ChatError::GeneralQuery)?;

        Ok(completion
            .content
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::Role;
    use switchboard_providers::ScriptedCompletion;

    #[tokio::test]
    async fn test_single_call_without_tools() {
        let provider = Arc::new(ScriptedCompletion::new().reply("A cat is a small feline."));
        let responder = DirectResponder::new(provider.clone(), "gemma2-9b-it");
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello!"),
        ];

        let reply = responder.respond("What is a cat?", &history).await.unwrap();
        assert_eq!(reply, "A cat is a small feline.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, "gemma2-9b-it");
        assert!(req.tools.is_none());
        assert!(req.tool_choice.is_none());
        assert_eq!(req.messages.len(), 4);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[3], ConversationTurn::user("What is a cat?"));
    }

    #[tokio::test]
    async fn test_empty_reply_placeholder() {
        let provider = Arc::new(ScriptedCompletion::new().empty());
        let responder = DirectResponder::new(provider, "gemma2-9b-it");
        assert_eq!(responder.respond("hi", &[]).await.unwrap(), NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_failure_wrapped() {
        let provider = Arc::new(ScriptedCompletion::new().fail("down"));
        let responder = DirectResponder::new(provider, "gemma2-9b-it");
        let err = responder.respond("hi", &[]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to execute general query: HTTP 500: down"
        );
    }

    #[tokio::test]
    async fn test_sampling_forwarded() {
        let provider = Arc::new(ScriptedCompletion::new().reply("ok"));
        let responder = DirectResponder::new(provider.clone(), "gemma2-9b-it").with_sampling(
            SamplingParams {
                temperature: Some(0.3),
                max_tokens: Some(256),
            },
        );
        responder.respond("hi", &[]).await.unwrap();
        assert_eq!(provider.requests()[0].sampling.max_tokens, Some(256));
    }
}
