//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Own the process metrics registry (one instance, shared by `Arc`)
//! - Define the HTTP RED instruments
//! - Encode the registry in OpenMetrics text format for scraping
//!
//! # Metrics
//! - `request_duration_seconds` (histogram): latency by method, path, code;
//!   carries `traceID` exemplars when the request is traced
//! - `request_size_bytes` (histogram): request body size by method, path, code
//! - `response_size_bytes` (histogram): response body size by method, path, code
//! - `requests_in_flight` (gauge): requests currently being served by method, path
//!
//! # Design Decisions
//! - `path` is the route template, never the raw URL
//! - Duration buckets are denser around the 500ms latency objective
//! - Families and atomics synchronize internally; callers hold no locks

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::exemplar::HistogramWithExemplars;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

use crate::observability::tracing::TraceId;

/// Content type of the `/metrics` response.
pub const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0, 10.0,
];

const SIZE_BUCKETS: &[f64] = &[100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0];

/// Labels for per-request histograms.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    /// Route template, or "unknown" when no route matched.
    pub path: String,
    /// HTTP status code.
    pub code: String,
}

/// Labels for the in-flight gauge.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct InFlightLabels {
    pub method: String,
    pub path: String,
}

/// Exemplar attached to a duration observation.
///
/// Encodes as `traceID`, the label dashboards use to link into traces.
#[allow(non_snake_case)]
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TraceExemplar {
    pub traceID: String,
}

/// HTTP request instruments.
///
/// Cloning is cheap: every family is reference counted and shared with the
/// registry it was registered in.
#[derive(Clone, Debug)]
pub struct HttpMetrics {
    pub request_duration: Family<RequestLabels, HistogramWithExemplars<TraceExemplar>>,
    pub request_size: Family<RequestLabels, Histogram>,
    pub response_size: Family<RequestLabels, Histogram>,
    pub requests_in_flight: Family<InFlightLabels, Gauge>,
}

impl HttpMetrics {
    /// Create the instruments and register them.
    pub fn new(registry: &mut Registry) -> Self {
        let request_duration =
            Family::<RequestLabels, HistogramWithExemplars<TraceExemplar>>::new_with_constructor(|| {
                HistogramWithExemplars::new(DURATION_BUCKETS.iter().copied())
            });
        registry.register(
            "request_duration_seconds",
            "Duration of HTTP requests in seconds",
            request_duration.clone(),
        );

        let request_size = Family::<RequestLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(SIZE_BUCKETS.iter().copied())
        });
        registry.register(
            "request_size_bytes",
            "Size of HTTP requests in bytes",
            request_size.clone(),
        );

        let response_size = Family::<RequestLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(SIZE_BUCKETS.iter().copied())
        });
        registry.register(
            "response_size_bytes",
            "Size of HTTP responses in bytes",
            response_size.clone(),
        );

        let requests_in_flight = Family::<InFlightLabels, Gauge>::default();
        registry.register(
            "requests_in_flight",
            "Number of HTTP requests currently being processed",
            requests_in_flight.clone(),
        );

        Self {
            request_duration,
            request_size,
            response_size,
            requests_in_flight,
        }
    }

    pub fn inc_in_flight(&self, labels: &InFlightLabels) {
        self.requests_in_flight.get_or_create(labels).inc();
    }

    pub fn dec_in_flight(&self, labels: &InFlightLabels) {
        self.requests_in_flight.get_or_create(labels).dec();
    }

    /// Current in-flight count for a method and route template.
    pub fn in_flight(&self, method: &str, path: &str) -> i64 {
        self.requests_in_flight
            .get_or_create(&InFlightLabels {
                method: method.to_string(),
                path: path.to_string(),
            })
            .get()
    }

    /// Record request duration, linking it to a trace when one is known.
    pub fn observe_duration(&self, labels: &RequestLabels, seconds: f64, trace_id: Option<TraceId>) {
        let exemplar = trace_id.map(|id| TraceExemplar {
            traceID: id.to_string(),
        });
        self.request_duration.get_or_create(labels).observe(seconds, exemplar);
    }

    pub fn observe_sizes(&self, labels: &RequestLabels, request_bytes: u64, response_bytes: u64) {
        self.request_size.get_or_create(labels).observe(request_bytes as f64);
        self.response_size.get_or_create(labels).observe(response_bytes as f64);
    }
}

/// The process metrics registry together with the instruments registered in it.
///
/// Created once at startup and passed by reference to whatever records or
/// exposes metrics. Tests create their own isolated instances.
#[derive(Debug)]
pub struct Metrics {
    registry: Registry,
    http: HttpMetrics,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let http = HttpMetrics::new(&mut registry);
        Self { registry, http }
    }

    pub fn http(&self) -> &HttpMetrics {
        &self.http
    }

    /// Encode every registered metric in OpenMetrics text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
