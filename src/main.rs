//! Nourish API Server
//!
//! Run with: cargo run -- serve
//!
//! # Configuration
//!
//! Config file lookup: `--config PATH`, then `~/.config/nourish/config.toml`,
//! `/etc/nourish/config.toml`, `./config.toml`. Environment variables
//! (`NOURISH_API_PORT`, `NOURISH_UPSTREAM_URL`, ...) override file values.
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use nourish::api::{serve, AppState};
use nourish::config::{generate_default_config, Config};
use nourish::services::{UpstreamClient, UpstreamConfig};
use nourish::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "nourish")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Household nutrition dashboard API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a default config file
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => run_server(config, host, port).await,
        Commands::Config => {
            print!("{}", generate_default_config());
            Ok(())
        }
    }
}

async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    // No subscriber yet: load errors are reported by main's error return
    let (mut config, source) = match config_path {
        Some(path) => (Config::load_with_env(&path)?, Some(path)),
        None => Config::load_default()?,
    };

    if let Some(host) = host {
        config.api.host = host;
    }
    if let Some(port) = port {
        config.api.port = port;
    }

    telemetry::init(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Starting Nourish API server v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }
    tracing::info!("Upstream nutrition API: {}", config.upstream.url);

    if config.auth.tokens.is_empty() && config.auth.trusted_header.is_none() {
        tracing::warn!("No auth tokens or trusted header configured, all dashboard requests will be rejected");
    }
    if !config.rate_limit.enabled {
        tracing::info!("Rate limiting disabled");
    }

    let upstream = UpstreamClient::new(UpstreamConfig::from(&config.upstream))
        .context("Failed to create upstream client")?;

    let api_config = config.api.clone();
    let state = AppState::new(Arc::new(upstream), config);

    serve(state, &api_config).await?;

    tracing::info!("Nourish API server stopped");
    Ok(())
}
