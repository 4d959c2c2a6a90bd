//! Prompter relay daemon
//!
//! Binds the WebSocket relay and logs every latest-message update, standing
//! in for the display/speech consumers a host application would attach.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prompter_core::config::{self, RelayConfig};
use prompter_server::MessageRelay;

#[derive(Parser)]
#[command(name = "prompter-server")]
#[command(about = "WebSocket message relay daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(short, long)]
    bind: Option<IpAddr>,

    /// Listening port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Prompter relay starting...");

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        config::load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            config::load_config(&default_path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                RelayConfig::default()
            })
        } else {
            tracing::info!("Using default configuration");
            RelayConfig::default()
        }
    };

    // Apply command-line overrides
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let relay = MessageRelay::new(config);

    let addr = relay
        .start()
        .await
        .context("Failed to start relay server")?;
    tracing::info!("Accepting connections on ws://{}", addr);

    // Stand in for the display: log every latest-message update
    let mut subscription = relay.subscribe();
    let display_task = tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            if message.is_empty() {
                continue;
            }
            tracing::info!("Display: {}", message);
        }
    });

    wait_for_shutdown_signal().await;
    tracing::info!("Shutting down...");

    relay.stop().await;
    display_task.abort();

    tracing::info!("Relay shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
