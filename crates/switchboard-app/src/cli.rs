//! CLI argument definitions for the switchboard binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How Telegram updates reach the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Telegram pushes updates to the webhook route.
    Webhook,
    /// The bot long-polls `getUpdates`.
    Polling,
}

/// Switchboard: a chat bot that answers directly or through web search and
/// a calculator.
#[derive(Parser, Debug)]
#[command(name = "switchboard", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Update delivery mode. Defaults to webhook when a public URL is
    /// configured, polling otherwise.
    #[arg(short = 'm', long = "mode", value_enum)]
    pub mode: Option<RunMode>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SWITCHBOARD_CONFIG env var > ~/.switchboard/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(std::env::var("SWITCHBOARD_CONFIG").ok())
    }

    fn resolve_config_path_with(&self, env_path: Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env_path.filter(|p| !p.is_empty()) {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the HTTP port.
    ///
    /// Priority: --port flag > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        self.port.unwrap_or(config_port)
    }

    /// Resolve the log filter directive used when `RUST_LOG` is unset.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Resolve the run mode.
    ///
    /// Priority: --mode flag > webhook if a public URL is configured > polling.
    pub fn resolve_mode(&self, public_url: Option<&str>) -> RunMode {
        match (self.mode, public_url) {
            (Some(mode), _) => mode,
            (None, Some(url)) if !url.trim().is_empty() => RunMode::Webhook,
            (None, _) => RunMode::Polling,
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".switchboard").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".switchboard").join("config.toml");
    }
    PathBuf::from("config.toml")
}
