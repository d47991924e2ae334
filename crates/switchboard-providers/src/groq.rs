//! Groq chat completion client.
//!
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint, so this
//! client speaks the generic wire format in [`crate::wire`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use switchboard_core::config::LlmConfig;

use crate::completion::{Completion, CompletionProvider, CompletionRequest};
use crate::error::ProviderError;
use crate::wire::{parse_completion_response, WireRequest};

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for an OpenAI-compatible completion endpoint.
pub struct GroqClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl GroqClient {
    /// Build a client from the `[llm]` config section.
    ///
    /// Fails when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::Config {
                reason: "GROQ_API_KEY is required but was not provided".into(),
            })?;
        Self::new(&config.base_url, api_key, config.request_timeout_secs)
    }

    /// Create a client for `base_url` with a request timeout.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
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
            timeout_secs,
        })
    }

    /// Endpoint base, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = WireRequest::from_request(&request);

        tracing::debug!(
            model = %request.model,
            message_count = request.messages.len(),
            with_tools = request.has_tools(),
            "sending completion request"
        );

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
            tracing::warn!(
                model = %request.model,
                status = status.as_u16(),
                "completion request rejected"
            );
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

        parse_completion_response(&body_text)
    }
}
