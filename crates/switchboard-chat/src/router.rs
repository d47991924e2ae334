//! Intent classification.
//!
//! One completion call decides whether a query needs a tool. Failures
//! never surface: any provider error degrades to [`RouteDecision::None`].

use std::sync::Arc;
use std::time::Duration;

use switchboard_core::{ConversationTurn, RouteDecision};
use switchboard_providers::{CompletionProvider, CompletionRequest, SamplingParams};

use crate::call::complete_within;
use crate::prompts::routing_prompt;

const CALCULATE_MARKER: &str = "CALCULATE";
const SEARCH_MARKER: &str = "SEARCH";

/// Classifies queries into routes with a routing-specific model.
pub struct IntentRouter {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    sampling: SamplingParams,
    timeout: Duration,
}

impl IntentRouter {
    /// Create a new `IntentRouter` classifying with `model`.
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            sampling: SamplingParams::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the classification deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Model used for classification.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Decide the route for `query`.
    pub async fn classify(&self, query: &str) -> RouteDecision {
        let request = CompletionRequest::new(
            self.model.clone(),
            vec![ConversationTurn::user(routing_prompt(query))],
        )
        .with_sampling(self.sampling);

        match complete_within(self.provider.as_ref(), request, self.timeout).await {
            Ok(completion) => {
                let raw = completion.content.unwrap_or_default();
                let route = parse_route(&raw);
                tracing::debug!(model = %self.model, response = %raw.trim(), route = %route, "classified query");
                route
            }
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "classification failed, answering without tools");
                RouteDecision::None
            }
        }
    }
}

/// Map raw classifier output to a route.
///
/// Matches by substring after trimming and uppercasing; the calculate
/// marker wins over the search marker.
pub fn parse_route(raw: &str) -> RouteDecision {
    let normalized = raw.trim().to_uppercase();
    if normalized.contains(CALCULATE_MARKER) {
        RouteDecision::Calculate
    } else if normalized.contains(SEARCH_MARKER) {
        RouteDecision::Search
    } else {
        RouteDecision::None
    }
}
