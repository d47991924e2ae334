//! Switchboard binary - composition root.
//!
//! 1. Load configuration from TOML, then env and CLI overrides
//! 2. Build the completion and search clients
//! 3. Wire the tool registry, router, orchestrator, responder and store
//!    into a query coordinator
//! 4. Serve the HTTP surface, plus the polling loop in polling mode

mod cli;

use std::sync::Arc;

use clap::Parser;

use switchboard_api::{start_server, AppState, Poller, TelegramClient};
use switchboard_chat::QueryCoordinator;
use switchboard_core::SwitchboardConfig;
use switchboard_providers::{GroqClient, TavilyClient};
use switchboard_tools::ToolRegistry;

use crate::cli::{CliArgs, RunMode};

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the file can set the log level.
    let config_file = args.resolve_config_path();
    let mut config = SwitchboardConfig::load_or_default(&config_file);
    config.apply_env_overrides();
    config.server.port = args.resolve_port(config.server.port);

    init_tracing(&args.resolve_log_level(&config.general.log_level));
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_file.display(),
        "Starting switchboard"
    );

    config.validate()?;
    config.validate_transport()?;
    let mode = args.resolve_mode(config.server.public_url.as_deref());

    // Providers.
    let completion = Arc::new(GroqClient::from_config(&config.llm)?);
    let search = Arc::new(TavilyClient::from_config(&config.search)?);
    tracing::info!(
        base_url = %completion.base_url(),
        default_model = %config.llm.default_model,
        routing_model = %config.llm.routing_model,
        tool_model = %config.llm.tool_model,
        "Completion provider ready"
    );

    // Tools and routing.
    let registry = Arc::new(ToolRegistry::with_defaults(search));
    let coordinator = Arc::new(QueryCoordinator::from_config(
        &config,
        completion,
        registry,
    )?);

    // Transport.
    let telegram = Arc::new(TelegramClient::from_config(&config.telegram)?);
    let state = AppState::new(coordinator, telegram.clone(), config.server.clone());

    match mode {
        RunMode::Webhook => {
            match config.server.public_url.as_deref() {
                Some(public_url) => {
                    let url = format!(
                        "{}{}",
                        public_url.trim_end_matches('/'),
                        config.server.webhook_path
                    );
                    telegram
                        .set_webhook(&url, config.server.webhook_secret.as_deref())
                        .await?;
                }
                None => tracing::warn!(
                    path = %config.server.webhook_path,
                    "Webhook mode without server.public_url; the webhook must be registered externally"
                ),
            }

            tokio::select! {
                result = start_server(state) => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
            }
        }
        RunMode::Polling => {
            if let Err(e) = telegram.delete_webhook().await {
                tracing::warn!(error = %e, "Failed to clear webhook; getUpdates may be refused");
            }
            let poller = Poller::new(
                telegram.clone(),
                state.clone(),
                config.telegram.poll_timeout_secs,
            );

            tokio::select! {
                _ = poller.run() => {}
                result = start_server(state) => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
            }
        }
    }

    Ok(())
}
