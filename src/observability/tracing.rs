//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests (W3C `traceparent`)
//! - Expose the trace id to the metrics interceptor via request extensions
//! - Build the per-request `tracing` span
//!
//! # Design Decisions
//! - Only reads an already-established trace; no sampling, no exporting
//! - Malformed or all-zero identifiers are ignored, never rejected

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::str::FromStr;
use tracing::Span;

pub const TRACEPARENT: &str = "traceparent";

/// A 128-bit trace identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

/// The input was not a valid trace identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trace id")]
pub struct InvalidTraceId;

impl TraceId {
    pub fn from_u128(value: u128) -> Option<Self> {
        (value != 0).then_some(Self(value))
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Read the trace id from a `traceparent` header, if present and valid.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(TRACEPARENT)?.to_str().ok()?;
        parse_traceparent(value)
    }
}

impl FromStr for TraceId {
    type Err = InvalidTraceId;

    /// Parse 32 lowercase hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_lower_hex(s, 32) {
            return Err(InvalidTraceId);
        }
        let value = u128::from_str_radix(s, 16).map_err(|_| InvalidTraceId)?;
        Self::from_u128(value).ok_or(InvalidTraceId)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Parse `version-traceid-parentid-flags`.
fn parse_traceparent(value: &str) -> Option<TraceId> {
    let mut parts = value.trim().split('-');
    let version = parts.next()?;
    let trace_id = parts.next()?;
    let parent_id = parts.next()?;
    let flags = parts.next()?;

    if !is_lower_hex(version, 2) || version == "ff" {
        return None;
    }
    // Version 00 has exactly four fields; later versions may append more.
    if version == "00" && parts.next().is_some() {
        return None;
    }
    if !is_lower_hex(parent_id, 16) || parent_id.bytes().all(|b| b == b'0') {
        return None;
    }
    if !is_lower_hex(flags, 2) {
        return None;
    }
    trace_id.parse().ok()
}

/// Middleware that attaches the incoming [`TraceId`] to the request.
pub async fn trace_context(mut req: Request<Body>, next: Next) -> Response {
    if let Some(trace_id) = TraceId::from_headers(req.headers()) {
        req.extensions_mut().insert(trace_id);
    }
    next.run(req).await
}

/// Span factory for `tower_http::trace::TraceLayer`.
pub fn make_request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let span = tracing::info_span!(
        "http.request",
        layer = "web",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
        trace_id = tracing::field::Empty,
    );
    if let Some(trace_id) = req.extensions().get::<TraceId>() {
        span.record("trace_id", tracing::field::display(trace_id));
    }
    span
}
