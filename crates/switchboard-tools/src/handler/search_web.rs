//! Web search tool handler.

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_providers::SearchProvider;

use crate::args::ToolArgs;
use crate::error::ToolError;
use crate::handler::ToolHandler;
use crate::types::ToolKind;

/// Handler for `search_web`. Provider failures propagate as errors.
pub struct SearchWebHandler {
    provider: Arc<dyn SearchProvider>,
}

impl SearchWebHandler {
    /// Create a handler backed by `provider`.
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ToolHandler for SearchWebHandler {
    fn kind(&self) -> ToolKind {
        ToolKind::SearchWeb
    }

    async fn execute(&self, args: &ToolArgs) -> Result<serde_json::Value, ToolError> {
        let ToolArgs::SearchWeb(args) = args else {
            return Err(ToolError::InvalidArguments {
                tool: ToolKind::SearchWeb.to_string(),
                reason: format!("expected search_web arguments, got {}", args.kind()),
            });
        };

        let response = self.provider.search(&args.query).await?;
        tracing::info!(
            query = %args.query,
            result_count = response.results.len(),
            "web search completed"
        );
        serde_json::to_value(&response).map_err(|e| ToolError::HandlerFailed(e.to_string()))
    }

    fn describe(&self, args: &ToolArgs) -> String {
        match args {
            ToolArgs::SearchWeb(a) => format!("Search the web: {}", a.query),
            other => format!("Search the web: <{} arguments>", other.kind()),
        }
    }
}
