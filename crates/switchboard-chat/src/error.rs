//! Error types for the conversational router.

use switchboard_providers::ProviderError;
use switchboard_tools::ToolError;

use crate::orchestrator::Phase;

/// Errors from the chat pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("failed to execute query with tools: {0}")]
    ToolQuery(#[source] ProviderError),
    #[error("failed to execute general query: {0}")]
    GeneralQuery(#[source] ProviderError),
    #[error("invalid orchestrator transition: {0} -> {1}")]
    InvalidTransition(Phase, Phase),
    #[error("tool wiring error: {0}")]
    Wiring(#[from] ToolError),
    #[error("storage error: {0}")]
    StorageError(String),
}
