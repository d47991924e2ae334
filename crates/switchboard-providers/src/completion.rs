//! Completion provider abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::{ConversationTurn, ToolCall, ToolChoice, ToolDescriptor};

use crate::error::ProviderError;

/// Sampling knobs forwarded verbatim when set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SamplingParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// One chat completion request.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ConversationTurn>,
    /// Descriptor set shared across requests; never mutated.
    pub tools: Option<Arc<[ToolDescriptor]>>,
    pub tool_choice: Option<ToolChoice>,
    pub sampling: SamplingParams,
}

impl CompletionRequest {
    /// Create a request without tools.
    pub fn new(model: impl Into<String>, messages: Vec<ConversationTurn>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: None,
            tool_choice: None,
            sampling: SamplingParams::default(),
        }
    }

    /// Attach tool descriptors and a tool-choice policy.
    pub fn with_tools(mut self, tools: Arc<[ToolDescriptor]>, choice: ToolChoice) -> Self {
        self.tools = Some(tools);
        self.tool_choice = Some(choice);
        self
    }

    /// Set sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Whether tool descriptors are attached.
    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Provider reply: text, tool calls, or both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    /// `None` when the provider returned no text or an empty string.
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl Completion {
    /// A text-only completion; empty text counts as absent.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            content: (!content.is_empty()).then_some(content),
            tool_calls: Vec::new(),
        }
    }

    /// A completion carrying tool calls and no text.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
        }
    }

    /// Whether the provider asked for tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A remote chat-completion service.
///
/// Implementations must be safe to share across concurrent conversations.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "calculate".into(),
            description: "Perform mathematical calculations".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}, "required": []}),
        }
    }

    #[test]
    fn test_request_builder() {
        let tools: Arc<[ToolDescriptor]> = vec![descriptor()].into();
        let req = CompletionRequest::new("llama3-70b-8192", vec![ConversationTurn::user("hi")])
            .with_tools(tools.clone(), ToolChoice::Auto)
            .with_sampling(SamplingParams {
                temperature: Some(0.2),
                max_tokens: None,
            });
        assert_eq!(req.model, "llama3-70b-8192");
        assert!(req.has_tools());
        assert_eq!(req.tool_choice, Some(ToolChoice::Auto));
        assert_eq!(req.sampling.temperature, Some(0.2));
        assert!(Arc::ptr_eq(req.tools.as_ref().unwrap(), &tools));
    }

    #[test]
    fn test_request_without_tools() {
        let req = CompletionRequest::new("gemma2-9b-it", vec![]);
        assert!(!req.has_tools());
        assert!(req.tool_choice.is_none());
    }

    #[test]
    fn test_completion_text_empty_is_absent() {
        assert_eq!(Completion::text("").content, None);
        assert_eq!(Completion::text("4").content.as_deref(), Some("4"));
    }

    #[test]
    fn test_completion_tool_calls() {
        let c = Completion::tool_calls(vec![ToolCall {
            id: "call_1".into(),
            name: "calculate".into(),
            arguments: "{}".into(),
        }]);
        assert!(c.has_tool_calls());
        assert!(c.content.is_none());
        assert!(!Completion::text("x").has_tool_calls());
    }
}
