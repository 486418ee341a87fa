//! Deterministic shipping estimate.
//!
//! The estimate uses fixed constants so results are reproducible across
//! deployments. Distance is approximated by comparing the origin and
//! destination labels as plain strings; no geocoding is performed.

use crate::domain::EstimateResponse;

const BASE_COST: f64 = 5.0;
const COST_PER_WEIGHT_UNIT: f64 = 1.5;
const DISTANCE_COST: f64 = 10.0;

const LOCAL_DAYS: u32 = 3;
const REMOTE_DAYS: u32 = 5;
const HEAVY_WEIGHT_THRESHOLD: f64 = 10.0;
const HEAVY_EXTRA_DAYS: u32 = 2;

pub const CURRENCY: &str = "USD";
pub const CARRIER_LABEL: &str = "Standard Shipping";

/// Compute cost and transit days for a package. Pure; never fails.
pub fn estimate(origin: &str, destination: &str, weight: f64) -> EstimateResponse {
    let same_place = origin == destination;

    let distance_cost = if same_place { 0.0 } else { DISTANCE_COST };
    let mut estimated_days = if same_place { LOCAL_DAYS } else { REMOTE_DAYS };
    if weight > HEAVY_WEIGHT_THRESHOLD {
        estimated_days += HEAVY_EXTRA_DAYS;
    }

    EstimateResponse {
        origin: origin.to_string(),
        destination: destination.to_string(),
        weight,
        estimated_cost: BASE_COST + weight * COST_PER_WEIGHT_UNIT + distance_cost,
        estimated_days,
        currency: CURRENCY.to_string(),
        carrier: CARRIER_LABEL.to_string(),
    }
}
