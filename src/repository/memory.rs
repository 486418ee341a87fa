//! In-memory shipment store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::domain::Shipment;
use crate::repository::{RepositoryError, ShipmentRepository};

/// A thread-safe shipment store keyed by tracking number.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShipmentRepository {
    shipments: Arc<DashMap<String, Shipment>>,
}

impl InMemoryShipmentRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a shipment.
    pub fn insert(&self, mut shipment: Shipment) {
        shipment.carrier = Shipment::normalize_carrier(shipment.carrier.take());
        self.shipments.insert(shipment.tracking_number.clone(), shipment);
    }

    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }
}

impl FromIterator<Shipment> for InMemoryShipmentRepository {
    fn from_iter<I: IntoIterator<Item = Shipment>>(iter: I) -> Self {
        let repo = Self::new();
        for shipment in iter {
            repo.insert(shipment);
        }
        repo
    }
}

#[async_trait]
impl ShipmentRepository for InMemoryShipmentRepository {
    async fn get_by_tracking_number(&self, tracking_number: &str) -> Result<Shipment, RepositoryError> {
        self.shipments
            .get(tracking_number)
            .map(|r| r.value().clone())
            .ok_or_else(|| RepositoryError::tracking_not_found(tracking_number))
    }

    async fn get_by_order_id(&self, order_id: i64) -> Result<Shipment, RepositoryError> {
        // Order ids are not indexed; the first match wins.
        self.shipments
            .iter()
            .find(|r| r.value().order_id == order_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| RepositoryError::order_not_found(order_id))
    }
}
