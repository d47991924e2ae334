//! Tavily web search client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use switchboard_core::config::SearchConfig;

use crate::error::ProviderError;
use crate::search::{require_query, SearchProvider, SearchResponse};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options sent with every search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub search_depth: String,
    pub max_results: u32,
    pub include_raw_content: bool,
    pub include_images: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_depth: "basic".into(),
            max_results: 4,
            include_raw_content: false,
            include_images: false,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            search_depth: config.search_depth.clone(),
            max_results: config.max_results,
            include_raw_content: config.include_raw_content,
            include_images: config.include_images,
            include_domains: config.include_domains.clone(),
            exclude_domains: config.exclude_domains.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_raw_content: bool,
    include_images: bool,
    include_domains: &'a [String],
    exclude_domains: &'a [String],
}

/// Client for the Tavily `/search` endpoint.
pub struct TavilyClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    options: SearchOptions,
    timeout_secs: u64,
}

impl TavilyClient {
    /// Build a client from the `[search]` config section.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::Config {
                reason: "TAVILY_API_KEY is required but was not provided".into(),
            })?;
        Self::new(
            &config.base_url,
            api_key,
            SearchOptions::from(config),
            config.request_timeout_secs,
        )
    }

    /// Create a client for `base_url` with explicit options.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        options: SearchOptions,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed {
                endpoint: base_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            options,
            timeout_secs,
        })
    }

    /// Options sent with every search.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    async fn send(&self, query: &str) -> Result<SearchResponse, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let body = TavilyRequest {
            query,
            search_depth: &self.options.search_depth,
            max_results: self.options.max_results,
            include_raw_content: self.options.include_raw_content,
            include_images: self.options.include_images,
            include_domains: &self.options.include_domains,
            exclude_domains: &self.options.exclude_domains,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, &url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                reason: format!("failed to read response body: {e}"),
            })?;

        serde_json::from_str(&body_text).map_err(|e| ProviderError::InvalidResponse {
            reason: format!("failed to parse search response: {e}"),
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, ProviderError> {
        let query = require_query(query)?;
        tracing::debug!(query = %query, depth = %self.options.search_depth, "running web search");

        self.send(query).await.map_err(|e| {
            tracing::warn!(error = %e, "web search failed");
            ProviderError::SearchFailed {
                reason: e.to_string(),
            }
        })
    }
}
