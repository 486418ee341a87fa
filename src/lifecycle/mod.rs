//! Process lifecycle: bring the service up, take it down cleanly.
//!
//! ```text
//! startup.rs   repository → ShippingService + Metrics → bind listener
//! signals.rs   SIGINT / SIGTERM → shutdown requested
//! shutdown.rs  broadcast → axum stops accepting → in-flight requests drain
//! ```
//!
//! A failure anywhere in startup aborts the process before the listener
//! accepts traffic.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
