//! Shipment lookup and estimate service.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → service.rs (span per operation, failure classification)
//!         → repository port (lookups)
//!         → estimate.rs (pure cost/day calculation)
//! ```

pub mod estimate;
pub mod service;

pub use service::ShippingService;
