//! Shipment repository port and adapters.
//!
//! # Data Flow
//! ```text
//! ShippingService
//!     → ShipmentRepository (trait object, injected)
//!         → postgres.rs (tokio-postgres, production)
//!         → memory.rs   (DashMap, tests and database-less runs)
//! ```
//!
//! # Design Decisions
//! - Each operation is a single point lookup; the first matching row wins
//! - "No row" is classified here as `NotFound`; every other backend failure
//!   is a `Query` error that keeps its cause
//! - The port is injected by the caller, never reached through a global

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{BoxError, Shipment, ShippingError};

pub use memory::InMemoryShipmentRepository;
pub use postgres::PostgresShipmentRepository;

/// Errors produced at the repository boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched the lookup key.
    #[error("{context}: shipment not found")]
    NotFound { context: String },

    /// Any other backend failure (connectivity, malformed query, decoding).
    #[error("query shipment: {0}")]
    Query(#[source] BoxError),
}

impl RepositoryError {
    pub fn query(err: impl Into<BoxError>) -> Self {
        Self::Query(err.into())
    }

    pub(crate) fn tracking_not_found(tracking_number: &str) -> Self {
        Self::NotFound {
            context: format!("track shipment with number {tracking_number:?}"),
        }
    }

    pub(crate) fn order_not_found(order_id: i64) -> Self {
        Self::NotFound {
            context: format!("get shipment for order {order_id}"),
        }
    }
}

impl From<RepositoryError> for ShippingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { context } => ShippingError::NotFound.context(context),
            other => ShippingError::internal(other),
        }
    }
}

/// Read access to persisted shipments.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// Look up a shipment by its unique tracking number.
    async fn get_by_tracking_number(&self, tracking_number: &str) -> Result<Shipment, RepositoryError>;

    /// Look up the shipment belonging to an order.
    async fn get_by_order_id(&self, order_id: i64) -> Result<Shipment, RepositoryError>;
}
