//! Shared utilities for integration testing.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;

use shipping_service::domain::Shipment;
use shipping_service::http::{build_router, AppState, HttpServer};
use shipping_service::observability::Metrics;
use shipping_service::repository::{InMemoryShipmentRepository, RepositoryError, ShipmentRepository};
use shipping_service::{ServiceConfig, ShippingService};

/// Shipments every test store starts with.
pub fn sample_shipments() -> Vec<Shipment> {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    vec![
        Shipment {
            id: 1,
            order_id: 1001,
            tracking_number: "TRK-1001".into(),
            carrier: Some("UPS".into()),
            status: "in_transit".into(),
            estimated_delivery: Some(Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap()),
            created_at: created,
            updated_at: created,
        },
        Shipment {
            id: 2,
            order_id: 1002,
            tracking_number: "TRK-1002".into(),
            carrier: Some(String::new()),
            status: "pending".into(),
            estimated_delivery: None,
            created_at: created,
            updated_at: created,
        },
    ]
}

pub fn seeded_repository() -> Arc<dyn ShipmentRepository> {
    Arc::new(sample_shipments().into_iter().collect::<InMemoryShipmentRepository>())
}

/// A repository whose backend is always down.
pub struct UnreachableRepository;

#[async_trait]
impl ShipmentRepository for UnreachableRepository {
    async fn get_by_tracking_number(&self, _: &str) -> Result<Shipment, RepositoryError> {
        Err(RepositoryError::query("connection refused"))
    }

    async fn get_by_order_id(&self, _: i64) -> Result<Shipment, RepositoryError> {
        Err(RepositoryError::query("connection refused"))
    }
}

/// Build the full application router over `repo` with an isolated registry.
pub fn app_with(repo: Arc<dyn ShipmentRepository>) -> (Router, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new());
    let server = HttpServer::new(ServiceConfig::default(), ShippingService::new(repo), metrics.clone());
    (server.router(), metrics)
}

/// Router for a config with `/metrics` switched off.
pub fn app_without_metrics_endpoint() -> (Router, Arc<Metrics>) {
    let mut config = ServiceConfig::default();
    config.observability.metrics_enabled = false;

    let metrics = Arc::new(Metrics::new());
    let state = AppState {
        service: ShippingService::new(seeded_repository()),
        metrics: metrics.clone(),
    };
    (build_router(&config, state), metrics)
}

pub fn app() -> (Router, Arc<Metrics>) {
    app_with(seeded_repository())
}

/// Send a GET through the router and return status and body.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(router, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Read the value of one sample line, e.g.
/// `request_duration_seconds_count{method="GET",path="/x",code="200"}`.
pub fn sample(text: &str, series: &str) -> Option<f64> {
    text.lines().find_map(|line| {
        let rest = line.strip_prefix(series)?.strip_prefix(' ')?;
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// Number of duration observations for a method, route and status code.
pub fn request_count(metrics: &Metrics, method: &str, path: &str, code: u16) -> u64 {
    let text = metrics.encode().unwrap();
    let series = format!(
        r#"request_duration_seconds_count{{method="{method}",path="{path}",code="{code}"}}"#
    );
    sample(&text, &series).unwrap_or(0.0) as u64
}

/// Serve the application on an ephemeral port.
///
/// Returns the bound address and a sender that stops the server.
pub async fn spawn_server(repo: Arc<dyn ShipmentRepository>) -> (SocketAddr, broadcast::Sender<()>) {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, ShippingService::new(repo), Arc::new(Metrics::new()));

    let (tx, rx) = broadcast::channel(1);
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (addr, tx)
}
