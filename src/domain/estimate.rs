//! Estimate value objects.

use serde::{Deserialize, Serialize};

/// Input to a shipping estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub origin: String,
    pub destination: String,
    pub weight: f64,
}

/// A computed shipping estimate. Not persisted; recomputed per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub origin: String,
    pub destination: String,
    pub weight: f64,
    pub estimated_cost: f64,
    pub estimated_days: u32,
    /// Always "USD".
    pub currency: String,
    /// Always "Standard Shipping".
    pub carrier: String,
}
