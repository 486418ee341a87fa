//! Shipping Service
//!
//! Looks up shipments and estimates shipping costs over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                 SHIPPING SERVICE                 │
//!                        │                                                  │
//!   Client Request       │  ┌──────────────┐   ┌──────────┐   ┌──────────┐  │
//!   ─────────────────────┼─▶│observability │──▶│   http   │──▶│ shipping │  │
//!                        │  │ interceptor  │   │ handlers │   │ service  │  │
//!                        │  └──────────────┘   └──────────┘   └────┬─────┘  │
//!                        │                                         │        │
//!                        │                                         ▼        │
//!   Client Response      │  ┌──────────────┐                ┌────────────┐  │
//!   ◀────────────────────┼──│ RED metrics  │                │ repository │◀─┼── PostgreSQL
//!                        │  │ + exemplars  │                │    port    │  │
//!                        │  └──────────────┘                └────────────┘  │
//!                        │                                                  │
//!                        │  Cross-cutting: config, logging, lifecycle       │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use shipping_service::config::{loader, ServiceConfig};
use shipping_service::lifecycle::{startup, Shutdown};
use shipping_service::observability::logging;

#[derive(Parser)]
#[command(name = "shipping-service")]
#[command(about = "Shipment lookup and shipping estimate service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => ServiceConfig::default(),
    };
    let config = loader::apply_env_overrides(config)?;

    logging::init(&config.observability)?;

    tracing::info!("shipping-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = config.database.url.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let (server, listener) = startup::start(config).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    shutdown.trigger_on_signal();
    server.run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
