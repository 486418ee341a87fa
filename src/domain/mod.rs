//! Shipping domain model.
//!
//! # Responsibilities
//! - Define the persisted `Shipment` record and its wire shape
//! - Define estimate request/response value objects
//! - Define the error taxonomy shared by the lookup layer and HTTP layer
//!
//! # Design Decisions
//! - Shipments are read-only here; the storage backend owns their lifecycle
//! - Optional fields are omitted from JSON rather than rendered as `""`
//! - Error kinds are compared by variant, never by message text

pub mod error;
pub mod estimate;
pub mod shipment;

pub use error::{BoxError, ErrorKind, ShippingError};
pub use estimate::{EstimateRequest, EstimateResponse};
pub use shipment::Shipment;
