//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, trace context, tracing, metrics,
//!   timeout, panic recovery)
//! - Bind server to listener and shut down gracefully

use axum::{
    http::HeaderName,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::response::ApiError;
use crate::observability::{self, HttpMetrics, Metrics};
use crate::shipping::ShippingService;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ShippingService,
    pub metrics: Arc<Metrics>,
}

/// HTTP server for the shipping API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, service: ShippingService, metrics: Arc<Metrics>) -> Self {
        let state = AppState { service, metrics };
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The assembled router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    let http_metrics = state.metrics.http().clone();

    let mut api = Router::new()
        .route("/api/v1/shipping/track", get(handlers::track_shipment))
        .route("/api/v1/shipping/estimate", get(handlers::estimate_shipping))
        .route("/api/v1/shipping/orders/{order_id}", get(handlers::get_shipment_by_order))
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));
    if config.observability.metrics_enabled {
        api = api.route("/metrics", get(handlers::metrics));
    }

    instrument(
        api.with_state(state),
        http_metrics,
        Duration::from_secs(config.timeouts.request_secs),
    )
}

/// Wrap a router in the standard middleware stack.
///
/// Order, outermost first: request ID, trace context, request span,
/// request ID propagation, metrics, timeout, panic recovery.
#[allow(deprecated)]
pub fn instrument(router: Router, metrics: HttpMetrics, request_timeout: Duration) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn_with_state(metrics, observability::track_requests))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(observability::tracing::make_request_span))
        .layer(middleware::from_fn(observability::trace_context))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::internal().into_response()
}
