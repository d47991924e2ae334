//! Web search provider abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One search hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Search results for a single query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

/// A remote web search service.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return structured results.
    ///
    /// Blank queries are rejected with [`ProviderError::InvalidRequest`]
    /// before any network call.
    async fn search(&self, query: &str) -> Result<SearchResponse, ProviderError>;
}

/// Reject blank queries with the canonical message.
pub fn require_query(query: &str) -> Result<&str, ProviderError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::InvalidRequest {
            reason: "search query is required".into(),
        });
    }
    Ok(trimmed)
}
