//! Startup orchestration.
//!
//! # Responsibilities
//! - Choose and connect the shipment repository
//! - Create the metrics registry and the service
//! - Bind the listener last, so traffic arrives only when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No database URL means an empty in-memory store, with a warning

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::{DatabaseConfig, ServiceConfig};
use crate::http::HttpServer;
use crate::observability::Metrics;
use crate::repository::{
    InMemoryShipmentRepository, PostgresShipmentRepository, RepositoryError, ShipmentRepository,
};
use crate::shipping::ShippingService;

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database: {0}")]
    Database(#[from] RepositoryError),

    #[error("bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Build the repository selected by configuration.
pub async fn connect_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn ShipmentRepository>, RepositoryError> {
    match &config.url {
        Some(url) => {
            let timeout = Duration::from_secs(config.connect_timeout_secs);
            let repo = PostgresShipmentRepository::connect(url, timeout).await?;
            Ok(Arc::new(repo))
        }
        None => {
            tracing::warn!("No database.url configured; serving shipments from an empty in-memory store");
            Ok(Arc::new(InMemoryShipmentRepository::new()))
        }
    }
}

/// Initialize every subsystem and bind the listener.
pub async fn start(config: ServiceConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let repo = connect_repository(&config.database).await?;
    let service = ShippingService::new(repo);
    let metrics = Arc::new(Metrics::new());

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    Ok((HttpServer::new(config, service, metrics), listener))
}
