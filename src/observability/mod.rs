//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → tracing.rs (read traceparent, attach TraceId, request span)
//!     → middleware.rs (deny-list gate, in-flight gauge, timer)
//!     → handler
//!     → middleware.rs (duration + exemplar, sizes, gauge decrement)
//!
//! Consumers:
//!     → logging.rs (structured log events to stdout)
//!     → metrics.rs (OpenMetrics text on /metrics)
//! ```
//!
//! # Design Decisions
//! - One owned registry per process, passed by reference; no globals
//! - Route templates, not raw URLs, label every series
//! - Instrumentation is best-effort and never fails a request

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod tracing;

pub use metrics::{HttpMetrics, Metrics};
pub use middleware::{should_collect_metrics, track_requests, InFlightRequest};
pub use self::tracing::{trace_context, TraceId};
