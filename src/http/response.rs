//! Error responses.
//!
//! # Responsibilities
//! - Map error kinds to HTTP status codes
//! - Render errors as `{"error": "<message>"}`
//! - Keep internal details out of response bodies

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::ErrorKind;

/// Transport status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidAddress => StatusCode::BAD_REQUEST,
        ErrorKind::CarrierUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// A client-facing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// Build the response for a classified failure.
    ///
    /// `not_found` is the message used for `NotFound`, which differs per endpoint.
    pub fn from_kind(kind: ErrorKind, not_found: &str) -> Self {
        let message = match kind {
            ErrorKind::NotFound => not_found,
            ErrorKind::InvalidAddress => "Invalid address",
            ErrorKind::CarrierUnavailable => "Carrier unavailable",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Internal => "Internal server error",
        };
        Self::new(status_for(kind), message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: &self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::InvalidAddress), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::CarrierUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::from_kind(ErrorKind::NotFound, "Shipment not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"error":"Shipment not found"}"#);
    }
}
