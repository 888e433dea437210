//! Feed Gateway (v1)
//!
//! Exposes registered consumers over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                     FEED GATEWAY                       │
//!                      │                                                       │
//!   Client Request     │  ┌─────────┐    ┌──────────┐    ┌────────────┐        │
//!   ───────────────────┼─▶│  http   │───▶│  decode  │───▶│  dispatch  │        │
//!                      │  │ server  │    │ q/mp/raw │    │ + routing  │        │
//!                      │  └─────────┘    └──────────┘    └─────┬──────┘        │
//!                      │                                       │               │
//!                      │                                       ▼               │
//!   Client Response    │  ┌─────────┐    ┌──────────┐    ┌────────────┐        │
//!   ◀──────────────────┼──│response │◀───│  encode  │◀───│  consumer  │        │
//!                      │  │+corr id │    │ 0/1/N    │    │  registry  │        │
//!                      │  └─────────┘    └──────────┘    └────────────┘        │
//!                      │                                                       │
//!                      │  Cross-cutting: config, observability, lifecycle      │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use feed_gateway::config::{load_config, GatewayConfig};
use feed_gateway::consumer::builtin::register_builtins;
use feed_gateway::lifecycle::{spawn_signal_handler, Shutdown};
use feed_gateway::observability::{init_logging, init_metrics};
use feed_gateway::{GatewayServer, StaticRegistry};

#[derive(Parser)]
#[command(name = "feed-gateway")]
#[command(about = "HTTP gateway in front of named consumers", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("feed-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix = %config.api.prefix,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = register_builtins(StaticRegistry::new(), &config.consumers.builtin);
    tracing::info!(consumers = ?registry.names(), "Consumers registered");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signals = spawn_signal_handler(shutdown.clone());

    let server = GatewayServer::new(config, Arc::new(registry));
    server.run(listener, shutdown.subscribe()).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
