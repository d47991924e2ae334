//! Query coordinator: the entry point for inbound chat text.
//!
//! Classifies the query, dispatches to the orchestrator or the direct
//! responder, and is the only place history is appended. Requests for the
//! same user are serialized by a per-user async lock held from the history
//! read through the append.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use switchboard_core::{InboundEvent, RouteDecision, SwitchboardConfig};
use switchboard_providers::{CompletionProvider, SamplingParams};
use switchboard_tools::{descriptor, ToolRegistry};

use crate::commands::{parse_command, Command, HELP_TEXT, RESET_ACK, START_TEXT};
use crate::error::ChatError;
use crate::orchestrator::ToolOrchestrator;
use crate::responder::DirectResponder;
use crate::router::IntentRouter;
use crate::store::ConversationStore;

/// Reply sent when answering fails.
pub const APOLOGY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Reply sent for blank input.
pub const EMPTY_MESSAGE_REPLY: &str = "Please send me a text message.";

/// Outcome of one handled input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub content: String,
    /// Route taken; `None` for built-in commands and blank input.
    pub route: Option<RouteDecision>,
    /// Tool names called, in order.
    pub tools_used: Vec<String>,
}

impl QueryResult {
    fn fixed(content: &str) -> Self {
        Self {
            content: content.to_string(),
            route: None,
            tools_used: Vec::new(),
        }
    }
}

type UserLock = Arc<tokio::sync::Mutex<()>>;

/// Ties the router, orchestrator, responder, and store together.
pub struct QueryCoordinator {
    router: IntentRouter,
    orchestrator: ToolOrchestrator,
    responder: DirectResponder,
    store: Arc<ConversationStore>,
    user_locks: Mutex<HashMap<String, UserLock>>,
}

impl QueryCoordinator {
    /// Create a coordinator from already-built components.
    pub fn new(
        router: IntentRouter,
        orchestrator: ToolOrchestrator,
        responder: DirectResponder,
        store: Arc<ConversationStore>,
    ) -> Self {
        Self {
            router,
            orchestrator,
            responder,
            store,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wire every component from config around one completion provider and
    /// a tool registry.
    pub fn from_config(
        config: &SwitchboardConfig,
        provider: Arc<dyn CompletionProvider>,
        registry: Arc<ToolRegistry>,
    ) -> Result<Self, ChatError> {
        let llm = &config.llm;
        let timeout = Duration::from_secs(llm.request_timeout_secs);
        let sampling = SamplingParams {
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        };

        let router = IntentRouter::new(provider.clone(), llm.routing_model.clone())
            .with_timeout(timeout)
            .with_sampling(sampling);
        let orchestrator = ToolOrchestrator::new(
            provider.clone(),
            registry,
            descriptor::all(),
            llm.routing_model.clone(),
            llm.tool_model.clone(),
        )?
        .with_timeout(timeout)
        .with_sampling(sampling);
        let responder = DirectResponder::new(provider, llm.default_model.clone())
            .with_timeout(timeout)
            .with_sampling(sampling);
        let store = Arc::new(ConversationStore::from_config(&config.conversation));

        Ok(Self::new(router, orchestrator, responder, store))
    }

    /// Shared conversation store.
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handle free text, detecting commands by the store's marker.
    pub async fn handle(&self, user_id: &str, text: &str) -> String {
        let is_command = self.store.is_command(text);
        self.handle_detailed(user_id, text, is_command).await.content
    }

    /// Handle an event from the transport.
    pub async fn handle_event(&self, event: &InboundEvent) -> String {
        self.handle_detailed(&event.user_id, &event.text, event.is_command)
            .await
            .content
    }

    /// Handle one input and report how it was answered.
    pub async fn handle_detailed(&self, user_id: &str, text: &str, is_command: bool) -> QueryResult {
        if text.trim().is_empty() {
            return QueryResult::fixed(EMPTY_MESSAGE_REPLY);
        }

        let lock = match self.lock_for(user_id) {
            Ok(lock) => lock,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "failed to acquire user lock");
                return QueryResult::fixed(APOLOGY);
            }
        };
        let result = {
            let _guard = lock.lock().await;
            self.handle_locked(user_id, text, is_command).await
        };
        drop(lock);
        self.release_lock(user_id);
        result
    }

    async fn handle_locked(&self, user_id: &str, text: &str, is_command: bool) -> QueryResult {
        if is_command {
            if let Some(parsed) = parse_command(text, self.store.command_marker()) {
                match parsed.command {
                    Command::Reset => {
                        return match self.store.reset(user_id) {
                            Ok(()) => QueryResult::fixed(RESET_ACK),
                            Err(e) => {
                                tracing::error!(user_id = %user_id, error = %e, "reset failed");
                                QueryResult::fixed(APOLOGY)
                            }
                        };
                    }
                    Command::Start => return QueryResult::fixed(START_TEXT),
                    Command::Help => return QueryResult::fixed(HELP_TEXT),
                    Command::Other(name) => {
                        tracing::debug!(
                            user_id = %user_id,
                            command = %name,
                            args = %parsed.args,
                            "unrecognized command, answering as query"
                        );
                    }
                }
            }
        }

        match self.answer(user_id, text, is_command).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "failed to answer query");
                QueryResult::fixed(APOLOGY)
            }
        }
    }

    async fn answer(&self, user_id: &str, text: &str, is_command: bool) -> Result<QueryResult, ChatError> {
        let history = self.store.get(user_id)?;
        let route = self.router.classify(text).await;
        tracing::info!(user_id = %user_id, route = %route, message_count = history.len(), "routing query");

        let (content, tools_used) = if route.needs_tools() {
            let outcome = self.orchestrator.run(text, &history).await?;
            (outcome.answer, outcome.tools_used)
        } else {
            (self.responder.respond(text, &history).await?, Vec::new())
        };

        if !is_command {
            self.store.append_exchange(user_id, text, &content)?;
        }

        Ok(QueryResult {
            content,
            route: Some(route),
            tools_used,
        })
    }

    fn lock_for(&self, user_id: &str) -> Result<UserLock, ChatError> {
        let mut locks = self
            .user_locks
            .lock()
            .map_err(|e| ChatError::StorageError(format!("user lock table poisoned: {}", e)))?;
        Ok(locks.entry(user_id.to_string()).or_default().clone())
    }

    /// Drop the user's lock entry once no request holds or awaits it.
    fn release_lock(&self, user_id: &str) {
        let Ok(mut locks) = self.user_locks.lock() else {
            return;
        };
        if locks
            .get(user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(user_id);
        }
    }

    /// Number of users with a request in flight.
    pub fn active_requests(&self) -> usize {
        self.user_locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}
