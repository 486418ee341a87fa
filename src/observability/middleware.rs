//! Request observability interceptor.
//!
//! Wraps every routed request and records RED metrics:
//!
//! ```text
//! Start      path on deny-list? → pass through untouched
//!            resolve route template, inc in-flight gauge, start timer
//! InFlight   downstream handler runs
//! Completed  observe duration (+ trace exemplar) and sizes, dec gauge
//! ```
//!
//! Completion lives in the `Drop` impl of [`InFlightRequest`], so it runs
//! exactly once on every exit path: normal return, handler panic, or the
//! request future being dropped mid-flight.

use axum::{
    body::{Body, HttpBody},
    extract::{MatchedPath, State},
    http::{header, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use crate::observability::metrics::{HttpMetrics, InFlightLabels, RequestLabels};
use crate::observability::tracing::TraceId;

/// Path prefixes excluded from instrumentation.
pub const INFRASTRUCTURE_PATHS: &[&str] = &["/health", "/ready", "/metrics", "/readiness", "/liveness"];

/// Route label used when no route template was resolved.
pub const UNKNOWN_ROUTE: &str = "unknown";

/// Status label for requests whose future was dropped before completing.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Whether a request path should be instrumented.
pub fn should_collect_metrics(path: &str) -> bool {
    !INFRASTRUCTURE_PATHS
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Method label with extension methods collapsed into one series.
fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        Method::CONNECT => "CONNECT",
        Method::TRACE => "TRACE",
        _ => "OTHER",
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// An instrumented request between Start and Completed.
#[derive(Debug)]
pub struct InFlightRequest {
    metrics: HttpMetrics,
    key: InFlightLabels,
    trace_id: Option<TraceId>,
    request_bytes: u64,
    started: Instant,
    outcome: Option<(u16, u64)>,
}

impl InFlightRequest {
    /// Enter the in-flight state: increments the gauge and starts the timer.
    pub fn start(
        metrics: HttpMetrics,
        method: &str,
        route: &str,
        trace_id: Option<TraceId>,
        request_bytes: u64,
    ) -> Self {
        let key = InFlightLabels {
            method: method.to_string(),
            path: route.to_string(),
        };
        metrics.inc_in_flight(&key);

        Self {
            metrics,
            key,
            trace_id,
            request_bytes,
            started: Instant::now(),
            outcome: None,
        }
    }

    /// Record the final status and response size, then complete.
    pub fn finish(mut self, status: StatusCode, response_bytes: u64) {
        self.outcome = Some((status.as_u16(), response_bytes));
    }
}

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let (code, response_bytes) = self.outcome.unwrap_or((CLIENT_CLOSED_REQUEST, 0));

        let labels = RequestLabels {
            method: self.key.method.clone(),
            path: self.key.path.clone(),
            code: code.to_string(),
        };
        self.metrics.observe_duration(&labels, elapsed, self.trace_id);
        self.metrics.observe_sizes(&labels, self.request_bytes, response_bytes);
        self.metrics.dec_in_flight(&self.key);

        if self.outcome.is_none() {
            tracing::debug!(
                method = %self.key.method,
                route = %self.key.path,
                "Request dropped before completion"
            );
        }
    }
}

/// Axum middleware recording RED metrics for each routed request.
///
/// Must be installed with `Router::layer` so the matched route template is
/// available.
pub async fn track_requests(
    State(metrics): State<HttpMetrics>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !should_collect_metrics(req.uri().path()) {
        return next.run(req).await;
    }

    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNKNOWN_ROUTE.to_string());
    let trace_id = req.extensions().get::<TraceId>().copied();
    let request_bytes = content_length(req.headers())
        .or_else(|| req.body().size_hint().exact())
        .unwrap_or(0);

    let in_flight = InFlightRequest::start(
        metrics,
        method_label(req.method()),
        &route,
        trace_id,
        request_bytes,
    );

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => {
            let response_bytes = response
                .body()
                .size_hint()
                .exact()
                .or_else(|| content_length(response.headers()))
                .unwrap_or(0);
            in_flight.finish(response.status(), response_bytes);
            response
        }
        Err(panic) => {
            in_flight.finish(StatusCode::INTERNAL_SERVER_ERROR, 0);
            std::panic::resume_unwind(panic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::Metrics;

    #[test]
    fn test_should_collect_metrics() {
        assert!(should_collect_metrics("/api/v1/shipping/track"));
        assert!(should_collect_metrics("/"));
        assert!(should_collect_metrics("/api/health"));

        for path in ["/health", "/healthz", "/ready", "/metrics", "/readiness", "/liveness/deep"] {
            assert!(!should_collect_metrics(path), "{path} should be skipped");
        }
    }

    #[test]
    fn test_method_label() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::from_bytes(b"PURGE").unwrap()), "OTHER");
    }

    #[test]
    fn test_guard_completes_once() {
        let metrics = Metrics::new();
        let http = metrics.http().clone();

        let guard = InFlightRequest::start(http.clone(), "GET", "/x", None, 10);
        assert_eq!(http.in_flight("GET", "/x"), 1);
        guard.finish(StatusCode::OK, 20);
        assert_eq!(http.in_flight("GET", "/x"), 0);

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"request_duration_seconds_count{method="GET",path="/x",code="200"} 1"#));
        assert!(text.contains(r#"response_size_bytes_sum{method="GET",path="/x",code="200"} 20"#));
    }

    #[test]
    fn test_dropped_guard_counts_as_client_closed() {
        let metrics = Metrics::new();
        let http = metrics.http().clone();

        drop(InFlightRequest::start(http.clone(), "GET", "/x", None, 0));
        assert_eq!(http.in_flight("GET", "/x"), 0);

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"request_duration_seconds_count{method="GET",path="/x",code="499"} 1"#));
    }
}
