//! Tool-augmented orchestration.
//!
//! Runs the function-calling protocol for one query in at most two
//! completion round trips:
//!
//! ```text
//! Composing -> AwaitingFirstCompletion -> Done
//!                                      -> ExecutingTools -> AwaitingFinalCompletion -> Done
//! ```
//!
//! Tool calls run sequentially in the order the provider returned them.
//! A failing tool call becomes an error envelope in the transcript; only
//! provider failures abort the query. History is read, never written.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use switchboard_core::{ConversationTurn, ToolCall, ToolChoice, ToolDescriptor, ToolResult};
use switchboard_providers::{CompletionProvider, CompletionRequest, SamplingParams};
use switchboard_tools::{ToolError, ToolRegistry};

use crate::call::complete_within;
use crate::error::ChatError;
use crate::prompts::TOOL_SYSTEM_PROMPT;

/// Reply used when the provider returns no text.
pub const NO_RESPONSE: &str = "No response generated";

// =============================================================================
// Phases
// =============================================================================

/// Orchestration phase for a single query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Composing,
    AwaitingFirstCompletion,
    ExecutingTools,
    AwaitingFinalCompletion,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Composing => write!(f, "composing"),
            Phase::AwaitingFirstCompletion => write!(f, "awaiting_first_completion"),
            Phase::ExecutingTools => write!(f, "executing_tools"),
            Phase::AwaitingFinalCompletion => write!(f, "awaiting_final_completion"),
            Phase::Done => write!(f, "done"),
        }
    }
}

impl Phase {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Composing, Phase::AwaitingFirstCompletion)
                | (Phase::AwaitingFirstCompletion, Phase::Done)
                | (Phase::AwaitingFirstCompletion, Phase::ExecutingTools)
                | (Phase::ExecutingTools, Phase::AwaitingFinalCompletion)
                | (Phase::AwaitingFinalCompletion, Phase::Done)
        )
    }
}

struct PhaseTracker {
    phase: Phase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: Phase::Composing,
        }
    }

    fn advance(&mut self, next: Phase) -> Result<(), ChatError> {
        if !self.phase.can_transition_to(next) {
            return Err(ChatError::InvalidTransition(self.phase, next));
        }
        tracing::trace!(from = %self.phase, to = %next, "orchestrator phase");
        self.phase = next;
        Ok(())
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Result of one orchestrated query.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorOutcome {
    pub answer: String,
    /// Messages sent on the last completion call.
    pub transcript: Vec<ConversationTurn>,
    /// Names of the tools called, in call order.
    pub tools_used: Vec<String>,
}

/// Drives the tool-calling protocol against a completion provider.
pub struct ToolOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    descriptors: Arc<[ToolDescriptor]>,
    routing_model: String,
    tool_model: String,
    sampling: SamplingParams,
    timeout: Duration,
}

impl ToolOrchestrator {
    /// Build an orchestrator. Fails if a descriptor has no handler.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        registry: Arc<ToolRegistry>,
        descriptors: Arc<[ToolDescriptor]>,
        routing_model: impl Into<String>,
        tool_model: impl Into<String>,
    ) -> Result<Self, ChatError> {
        registry.ensure_covers(&descriptors)?;
        Ok(Self {
            provider,
            registry,
            descriptors,
            routing_model: routing_model.into(),
            tool_model: tool_model.into(),
            sampling: SamplingParams::default(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Set the deadline for each completion call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set sampling parameters for both completion calls.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Tool descriptors offered to the provider.
    pub fn descriptors(&self) -> &Arc<[ToolDescriptor]> {
        &self.descriptors
    }

    /// Answer `query` with tool access, given a read-only history snapshot.
    pub async fn run(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<OrchestratorOutcome, ChatError> {
        let mut phase = PhaseTracker::new();

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationTurn::system(TOOL_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ConversationTurn::user(query));

        phase.advance(Phase::AwaitingFirstCompletion)?;
        let request = CompletionRequest::new(self.routing_model.clone(), messages.clone())
            .with_tools(self.descriptors.clone(), ToolChoice::Auto)
            .with_sampling(self.sampling);
        let first = complete_within(self.provider.as_ref(), request, self.timeout)
            .await
            .map_err(ChatError::ToolQuery)?;

        tracing::debug!(
            model = %self.routing_model,
            tool_calls = first.tool_calls.len(),
            "first completion received"
        );

        if !first.has_tool_calls() {
            phase.advance(Phase::Done)?;
            return Ok(OrchestratorOutcome {
                answer: first.content.unwrap_or_else(|| NO_RESPONSE.to_string()),
                transcript: messages,
                tools_used: Vec::new(),
            });
        }

        phase.advance(Phase::ExecutingTools)?;
        let mut tools_used = Vec::with_capacity(first.tool_calls.len());
        for call in first.tool_calls {
            let content = self.execute_call(&call).await;
            tools_used.push(call.name.clone());
            let result = ToolResult {
                tool_call_id: call.id.clone(),
                content,
            };
            messages.push(ConversationTurn::assistant_tool_call(call));
            messages.push(ConversationTurn::tool_result(result));
        }

        phase.advance(Phase::AwaitingFinalCompletion)?;
        let request = CompletionRequest::new(self.tool_model.clone(), messages.clone())
            .with_sampling(self.sampling);
        let last = complete_within(self.provider.as_ref(), request, self.timeout)
            .await
            .map_err(ChatError::ToolQuery)?;

        phase.advance(Phase::Done)?;
        Ok(OrchestratorOutcome {
            answer: last.content.unwrap_or_else(|| NO_RESPONSE.to_string()),
            transcript: messages,
            tools_used,
        })
    }

    /// Run one tool call; failures become an error envelope.
    async fn execute_call(&self, call: &ToolCall) -> String {
        match self.registry.dispatch(&call.name, &call.arguments).await {
            Ok(content) => {
                tracing::info!(tool = %call.name, call_id = %call.id, "tool call succeeded");
                content
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
                error_envelope(&e)
            }
        }
    }
}

/// Serialized `{"error": "Tool execution failed: <reason>"}`.
pub fn error_envelope(err: &ToolError) -> String {
    json!({ "error": format!("Tool execution failed: {err}") }).to_string()
}
