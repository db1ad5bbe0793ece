//! LedgerLink Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (see `--config`) with environment overrides:
//! - `LEDGERLINK_HOST`: Host to bind to (default: 0.0.0.0)
//! - `LEDGERLINK_PORT`: Port to listen on (default: 5000)
//! - `LEDGERLINK_MAX_SESSIONS`: Channel session ceiling (default: 1000)
//! - `LEDGERLINK_LOG_LEVEL` / `LEDGERLINK_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely when set

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerlink::api::{serve, AppState, ServerConfig};
use ledgerlink::config::{generate_default_config, Config};
use ledgerlink::fanout::{RegistryConfig, SessionRegistry};

/// Account-linking server with real-time event fanout
#[derive(Parser, Debug)]
#[command(name = "ledgerlink", version, about)]
struct Args {
    /// Path to a TOML config file (default: probe standard locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    /// Print a default config file to stdout and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config);

    tracing::info!("Starting LedgerLink server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Session ceiling: {}", config.fanout.max_sessions);

    let registry = Arc::new(SessionRegistry::new(RegistryConfig {
        max_sessions: config.fanout.max_sessions,
    }));

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);
    let state = AppState::new(Arc::clone(&registry), server_config.clone());

    tracing::info!(
        "Starting server on {}:{}",
        server_config.host,
        server_config.port
    );
    serve(state, &server_config).await?;

    tracing::info!("LedgerLink server stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("ledgerlink={},tower_http=debug", config.logging.level).into()
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
