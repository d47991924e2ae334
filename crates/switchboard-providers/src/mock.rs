//! Deterministic in-process providers for tests and offline runs.
//!
//! `ScriptedCompletion` replays a queue of replies in order and records
//! every request it receives. `StaticSearch` returns canned results.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use switchboard_core::ToolCall;

use crate::completion::{Completion, CompletionProvider, CompletionRequest};
use crate::error::ProviderError;
use crate::search::{require_query, SearchHit, SearchProvider, SearchResponse};

/// One scripted provider step.
#[derive(Debug)]
pub enum ScriptStep {
    Reply(Completion),
    /// Fail with an HTTP 500 carrying this body.
    Fail(String),
    /// Sleep for the duration, then reply.
    Delayed(Duration, Completion),
}

/// Completion provider that replays scripted steps in FIFO order.
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(ScriptStep::Reply(Completion::text(text)))
    }

    /// Queue a reply carrying tool calls and no text.
    pub fn tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.push(ScriptStep::Reply(Completion::tool_calls(calls)))
    }

    /// Queue a reply with neither text nor tool calls.
    pub fn empty(self) -> Self {
        self.push(ScriptStep::Reply(Completion::default()))
    }

    /// Queue a provider failure.
    pub fn fail(self, body: impl Into<String>) -> Self {
        self.push(ScriptStep::Fail(body.into()))
    }

    /// Queue a text reply that arrives after `delay`.
    pub fn delayed(self, delay: Duration, text: impl Into<String>) -> Self {
        self.push(ScriptStep::Delayed(delay, Completion::text(text)))
    }

    /// Queue an arbitrary step.
    pub fn push(self, step: ScriptStep) -> Self {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(step);
        }
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let step = self.steps.lock().ok().and_then(|mut s| s.pop_front());

        match step {
            Some(ScriptStep::Reply(completion)) => Ok(completion),
            Some(ScriptStep::Fail(body)) => Err(ProviderError::Http { status: 500, body }),
            Some(ScriptStep::Delayed(delay, completion)) => {
                tokio::time::sleep(delay).await;
                Ok(completion)
            }
            None => Err(ProviderError::InvalidResponse {
                reason: "script exhausted".into(),
            }),
        }
    }
}

/// Search provider returning a fixed response, or a fixed failure.
#[derive(Debug)]
pub struct StaticSearch {
    outcome: Result<Vec<SearchHit>, String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    /// Succeed with `hits` for every query.
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            outcome: Ok(hits),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A search provider whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str) -> Result<SearchResponse, ProviderError> {
        let query = require_query(query)?;
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        match &self.outcome {
            Ok(hits) => Ok(SearchResponse {
                query: query.to_string(),
                answer: None,
                results: hits.clone(),
                response_time: Some(0.0),
            }),
            Err(reason) => Err(ProviderError::SearchFailed {
                reason: reason.clone(),
            }),
        }
    }
}
