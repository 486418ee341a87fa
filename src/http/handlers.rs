//! HTTP handlers for the shipping API and infrastructure endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{EstimateRequest, EstimateResponse, Shipment};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics::OPENMETRICS_CONTENT_TYPE;

const SHIPMENT_NOT_FOUND: &str = "Shipment not found";
const ORDER_SHIPMENT_NOT_FOUND: &str = "Shipment not found for this order";

/// Query parameters for tracking lookups.
#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    pub tracking_number: Option<String>,
    /// Legacy alias for `tracking_number`.
    #[serde(rename = "trackingId")]
    pub tracking_id: Option<String>,
}

impl TrackQuery {
    /// The preferred parameter wins; the legacy alias is the fallback.
    pub fn tracking_number(&self) -> Option<&str> {
        [&self.tracking_number, &self.tracking_id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }
}

/// Raw query parameters for estimates. Validated into an [`EstimateRequest`].
#[derive(Debug, Default, Deserialize)]
pub struct EstimateQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub weight: Option<String>,
}

impl TryFrom<EstimateQuery> for EstimateRequest {
    type Error = ApiError;

    fn try_from(query: EstimateQuery) -> Result<Self, Self::Error> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        let (Some(origin), Some(destination), Some(weight)) = (
            non_empty(query.origin),
            non_empty(query.destination),
            non_empty(query.weight),
        ) else {
            return Err(ApiError::bad_request(
                "Missing required parameters: origin, destination, weight",
            ));
        };

        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid weight value"))?;
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ApiError::bad_request("Invalid weight value"));
        }

        Ok(EstimateRequest {
            origin,
            destination,
            weight,
        })
    }
}

/// GET /api/v1/shipping/track?tracking_number=X
pub async fn track_shipment(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<Shipment>, ApiError> {
    // A missing number is looked up as "", which never matches.
    let tracking_number = query.tracking_number().unwrap_or_default();

    match state.service.track_shipment(tracking_number).await {
        Ok(shipment) => {
            tracing::info!(tracking_number = %tracking_number, "Shipment tracked");
            Ok(Json(shipment))
        }
        Err(e) if e.is_not_found() => Err(ApiError::from_kind(e.kind(), SHIPMENT_NOT_FOUND)),
        Err(e) => {
            tracing::error!(error = %e, tracking_number = %tracking_number, "Failed to track shipment");
            Err(ApiError::from_kind(e.kind(), SHIPMENT_NOT_FOUND))
        }
    }
}

/// GET /api/v1/shipping/estimate?origin=&destination=&weight=
pub async fn estimate_shipping(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let request = EstimateRequest::try_from(query)?;

    let estimate = state
        .service
        .estimate_shipping(&request.origin, &request.destination, request.weight);

    tracing::info!(
        origin = %request.origin,
        destination = %request.destination,
        weight = request.weight,
        cost = estimate.estimated_cost,
        "Shipping estimated"
    );
    Ok(Json(estimate))
}

/// GET /api/v1/shipping/orders/{order_id}
pub async fn get_shipment_by_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Shipment>, ApiError> {
    let order_id: i64 = order_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid order ID"))?;

    match state.service.get_shipment_by_order_id(order_id).await {
        Ok(shipment) => {
            tracing::info!(order_id, shipment_id = shipment.id, "Shipment retrieved by order");
            Ok(Json(shipment))
        }
        Err(e) if e.is_not_found() => Err(ApiError::from_kind(e.kind(), ORDER_SHIPMENT_NOT_FOUND)),
        Err(e) => {
            tracing::error!(error = %e, order_id, "Failed to get shipment by order");
            Err(ApiError::from_kind(e.kind(), ORDER_SHIPMENT_NOT_FOUND))
        }
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

/// GET /ready
pub async fn ready() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ready",
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
