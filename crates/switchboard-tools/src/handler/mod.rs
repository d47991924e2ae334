//! Tool handler registry and trait definition.
//!
//! Defines the `ToolHandler` async trait and the registry that maps a tool
//! name to its handler. The registry is built once at startup and shared
//! read-only afterwards.

pub mod calculator;
pub mod search_web;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::ToolDescriptor;
use switchboard_providers::SearchProvider;

use crate::args::ToolArgs;
use crate::error::ToolError;
use crate::types::ToolKind;

pub use calculator::CalculatorHandler;
pub use search_web::SearchWebHandler;

/// An executable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn kind(&self) -> ToolKind;

    /// Run the tool. The returned value is serialized as the tool result.
    async fn execute(&self, args: &ToolArgs) -> Result<serde_json::Value, ToolError>;

    /// Short human-readable description of what `args` would do.
    fn describe(&self, args: &ToolArgs) -> String;
}

/// Maps tool kinds to handlers.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<ToolKind, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the calculator and a web search handler backed by
    /// `search`.
    pub fn with_defaults(search: Arc<dyn SearchProvider>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CalculatorHandler));
        registry.register(Arc::new(SearchWebHandler::new(search)));
        registry
    }

    /// Register a handler under its own kind, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Handler registered for `kind`, if any.
    pub fn get(&self, kind: ToolKind) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(&kind)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Check that every descriptor has a handler. Run once at wiring time.
    pub fn ensure_covers(&self, descriptors: &[ToolDescriptor]) -> Result<(), ToolError> {
        for descriptor in descriptors {
            let covered = descriptor
                .name
                .parse::<ToolKind>()
                .ok()
                .is_some_and(|kind| self.handlers.contains_key(&kind));
            if !covered {
                return Err(ToolError::UnregisteredTool(descriptor.name.clone()));
            }
        }
        Ok(())
    }

    /// Resolve `name`, parse `raw_arguments`, run the handler, and return
    /// the serialized result.
    ///
    /// Handler errors propagate unchanged; converting them into result
    /// envelopes is the caller's concern.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str) -> Result<String, ToolError> {
        let kind: ToolKind = name
            .parse()
            .map_err(|_| ToolError::UnregisteredTool(name.to_string()))?;
        let handler = self
            .get(kind)
            .ok_or_else(|| ToolError::UnregisteredTool(name.to_string()))?;
        let args = ToolArgs::parse(kind, raw_arguments)?;

        tracing::debug!(tool = %kind, action = %handler.describe(&args), "dispatching tool");

        let value = handler.execute(&args).await?;
        serde_json::to_string(&value).map_err(|e| ToolError::HandlerFailed(e.to_string()))
    }
}
