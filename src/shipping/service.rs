//! Shipment lookup and estimate orchestration.

use std::sync::Arc;
use tracing::{field, Span};

use crate::domain::{EstimateResponse, Shipment, ShippingError};
use crate::repository::ShipmentRepository;
use crate::shipping::estimate;

/// Business logic for shipment tracking and cost estimation.
#[derive(Clone)]
pub struct ShippingService {
    repo: Arc<dyn ShipmentRepository>,
}

impl ShippingService {
    /// Create a service over the given repository.
    pub fn new(repo: Arc<dyn ShipmentRepository>) -> Self {
        Self { repo }
    }

    /// Look up a shipment by tracking number.
    ///
    /// A missing shipment is an expected outcome: it is tagged on the span
    /// as `shipment.found = false` and returned as a `NotFound` error.
    #[tracing::instrument(
        name = "shipping.track",
        skip(self, tracking_number),
        fields(
            layer = "logic",
            api.version = "v1",
            tracking.number = %tracking_number,
            shipment.found = field::Empty,
            shipment.id = field::Empty,
            shipment.status = field::Empty,
            shipment.carrier = field::Empty,
        )
    )]
    pub async fn track_shipment(&self, tracking_number: &str) -> Result<Shipment, ShippingError> {
        let result = self
            .repo
            .get_by_tracking_number(tracking_number)
            .await
            .map_err(ShippingError::from);
        let shipment = record_lookup(result)?;

        let span = Span::current();
        if let Some(carrier) = &shipment.carrier {
            span.record("shipment.carrier", carrier.as_str());
        }
        Ok(shipment)
    }

    /// Look up the shipment belonging to an order.
    #[tracing::instrument(
        name = "shipping.get_by_order",
        skip(self, order_id),
        fields(
            layer = "logic",
            api.version = "v1",
            order.id = order_id,
            shipment.found = field::Empty,
            shipment.id = field::Empty,
            shipment.status = field::Empty,
        )
    )]
    pub async fn get_shipment_by_order_id(&self, order_id: i64) -> Result<Shipment, ShippingError> {
        let result = self
            .repo
            .get_by_order_id(order_id)
            .await
            .map_err(ShippingError::from);
        record_lookup(result)
    }

    /// Compute a shipping estimate. Never fails; inputs are validated by the caller.
    #[tracing::instrument(
        name = "shipping.estimate",
        skip(self),
        fields(
            layer = "logic",
            api.version = "v1",
            estimate.cost = field::Empty,
            estimate.days = field::Empty,
        )
    )]
    pub fn estimate_shipping(&self, origin: &str, destination: &str, weight: f64) -> EstimateResponse {
        let response = estimate::estimate(origin, destination, weight);

        let span = Span::current();
        span.record("estimate.cost", response.estimated_cost);
        span.record("estimate.days", response.estimated_days);
        response
    }
}

/// Tag the current span with the outcome of a point lookup.
fn record_lookup(result: Result<Shipment, ShippingError>) -> Result<Shipment, ShippingError> {
    let span = Span::current();
    match result {
        Ok(shipment) => {
            span.record("shipment.found", true);
            span.record("shipment.id", shipment.id);
            span.record("shipment.status", shipment.status.as_str());
            Ok(shipment)
        }
        Err(e) if e.is_not_found() => {
            span.record("shipment.found", false);
            tracing::debug!(error = %e, "Shipment not found");
            Err(e)
        }
        Err(e) => {
            tracing::error!(error = %e, "Shipment lookup failed");
            Err(e)
        }
    }
}
