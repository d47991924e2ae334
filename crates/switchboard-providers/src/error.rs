//! Provider error types.
//!
//! Structured logging is the caller's responsibility; these variants carry
//! the context needed to build a meaningful log entry.

use thiserror::Error;

/// Errors from completion and search provider calls.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// TCP/HTTP connection to the endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The endpoint did not respond within the configured timeout.
    #[error("provider timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be interpreted.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// The request was rejected before any network call.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Web search failed; wraps the underlying cause as text.
    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    /// Client construction or credential problem.
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl ProviderError {
    /// Whether the failure was a timeout, at any layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }

    /// Build from a reqwest transport error, classifying timeouts.
    pub(crate) fn from_reqwest(err: reqwest::Error, endpoint: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout {
                duration_secs: timeout_secs,
            }
        } else {
            ProviderError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_connection_failed() {
        let err = ProviderError::ConnectionFailed {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".into(),
            reason: "dns error".into(),
        };
        assert_eq!(
            err.to_string(),
            "connection failed to https://api.groq.com/openai/v1/chat/completions: dns error"
        );
    }

    #[test]
    fn test_display_timeout() {
        let err = ProviderError::Timeout { duration_secs: 30 };
        assert_eq!(err.to_string(), "provider timeout after 30s");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_display_http() {
        let err = ProviderError::Http {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "HTTP 429: rate limited");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_display_search_failed() {
        let err = ProviderError::SearchFailed {
            reason: "HTTP 401: unauthorized".into(),
        };
        assert_eq!(err.to_string(), "search failed: HTTP 401: unauthorized");
    }

    #[test]
    fn test_display_invalid_request() {
        let err = ProviderError::InvalidRequest {
            reason: "search query is required".into(),
        };
        assert_eq!(err.to_string(), "invalid request: search query is required");
    }
}
