//! Error taxonomy for shipping operations.
//!
//! Every failure produced by the lookup layer is one of a closed set of kinds.
//! Callers classify with [`ShippingError::kind`] or [`ShippingError::is`];
//! wrapping with [`ShippingError::context`] adds a message but never changes
//! the kind.
//!
//! ```
//! use shipping_service::domain::{ErrorKind, ShippingError};
//!
//! let err = ShippingError::NotFound.context("track shipment with number \"XYZ\"");
//! assert!(err.is(ErrorKind::NotFound));
//! assert_eq!(err.to_string(), "track shipment with number \"XYZ\": shipment not found");
//! ```

use thiserror::Error;

/// Opaque error type used as the source of backend failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a [`ShippingError`], independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidAddress,
    CarrierUnavailable,
    Unauthorized,
    /// Anything not covered by the named kinds.
    Internal,
}

/// Errors returned by the shipping service.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// The requested shipment does not exist.
    #[error("shipment not found")]
    NotFound,

    /// The shipping address is invalid or incomplete.
    #[error("invalid address")]
    InvalidAddress,

    /// The shipping carrier is unavailable.
    #[error("carrier unavailable")]
    CarrierUnavailable,

    /// The caller may not perform the operation.
    #[error("unauthorized access")]
    Unauthorized,

    /// Unclassified failure; the cause is kept for diagnostics.
    #[error("internal error: {0}")]
    Internal(#[source] BoxError),

    /// Another `ShippingError` with a contextual message in front of it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<ShippingError>,
    },
}

impl ShippingError {
    /// Wrap an arbitrary failure as an internal error.
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    /// Prefix this error with a contextual message, keeping its kind.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidAddress => ErrorKind::InvalidAddress,
            Self::CarrierUnavailable => ErrorKind::CarrierUnavailable,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Context { source, .. } => source.kind(),
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    pub fn is_not_found(&self) -> bool {
        self.is(ErrorKind::NotFound)
    }
}
