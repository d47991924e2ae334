use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SwitchboardError};

/// Top-level configuration for switchboard.
///
/// Loaded from `~/.switchboard/config.toml` by default. Credentials are
/// usually supplied through the environment instead, see
/// [`SwitchboardConfig::apply_env_overrides`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl SwitchboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SwitchboardConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| SwitchboardError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay credentials from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay credentials from an arbitrary lookup.
    ///
    /// Blank values are ignored so an exported-but-empty variable does not
    /// wipe a key that the config file provides.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GROQ_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("TAVILY_API_KEY") {
            self.search.api_key = Some(v);
        }
        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(v);
        }
        if let Some(v) = get("TELEGRAM_WEBHOOK_SECRET") {
            self.server.webhook_secret = Some(v);
        }
    }

    /// Check the settings the query pipeline cannot run without.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(SwitchboardError::Config(
                "GROQ_API_KEY is required but was not provided".to_string(),
            ));
        }
        if self.search.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(SwitchboardError::Config(
                "TAVILY_API_KEY is required but was not provided".to_string(),
            ));
        }
        if self.conversation.max_exchanges == 0 {
            return Err(SwitchboardError::Config(
                "conversation.max_exchanges must be at least 1".to_string(),
            ));
        }
        if self.conversation.command_marker.is_empty() {
            return Err(SwitchboardError::Config(
                "conversation.command_marker must not be empty".to_string(),
            ));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(SwitchboardError::Config(
                "llm.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check the settings the Telegram transport needs.
    pub fn validate_transport(&self) -> Result<()> {
        if self.telegram.bot_token.as_deref().map_or(true, str::is_empty) {
            return Err(SwitchboardError::Config(
                "TELEGRAM_BOT_TOKEN environment variable not found".to_string(),
            ));
        }
        let path = &self.server.webhook_path;
        if !path.starts_with('/') || path == "/health" || path == "/chat" {
            return Err(SwitchboardError::Config(format!(
                "server.webhook_path must start with '/' and not clash with built-in routes: {path}"
            )));
        }
        Ok(())
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Completion provider settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL, without the trailing `/chat/completions`.
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model for plain conversational replies.
    pub default_model: String,
    /// Model for intent classification and the first tool-aware call.
    pub routing_model: String,
    /// Model for synthesising the answer from tool results.
    pub tool_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Upper bound on a single completion call.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            default_model: "gemma2-9b-it".to_string(),
            routing_model: "llama3-70b-8192".to_string(),
            tool_model: "llama-3.3-70b-versatile".to_string(),
            temperature: None,
            max_tokens: None,
            request_timeout_secs: 30,
        }
    }
}

/// Web search provider settings (Tavily).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// "basic" or "advanced".
    pub search_depth: String,
    pub max_results: u32,
    pub include_raw_content: bool,
    pub include_images: bool,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            api_key: None,
            search_depth: "basic".to_string(),
            max_results: 4,
            include_raw_content: false,
            include_images: false,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Exchanges (user + assistant pairs) kept per user.
    pub max_exchanges: usize,
    /// Prefix that marks an input as a command.
    pub command_marker: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_exchanges: 10,
            command_marker: "/".to_string(),
        }
    }
}

/// HTTP server settings for the webhook surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub webhook_path: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`; unchecked when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    /// Public URL to register with Telegram on startup, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    pub max_requests_per_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            webhook_path: "/webhook/telegram".to_string(),
            webhook_secret: None,
            public_url: None,
            max_requests_per_sec: 50,
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    /// "Markdown", "MarkdownV2", "HTML", or empty for plain text.
    pub parse_mode: String,
    /// Long-poll wait passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: None,
            parse_mode: "Markdown".to_string(),
            poll_timeout_secs: 30,
        }
    }
}
