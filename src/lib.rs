//! Shipping service library.
//!
//! Shipment lookups and deterministic shipping estimates over HTTP, with
//! RED request metrics linked to traces through exemplars.

pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod repository;
pub mod shipping;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use shipping::ShippingService;
