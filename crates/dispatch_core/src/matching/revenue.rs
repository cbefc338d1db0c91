//! Projected revenue for a transport.

use crate::model::{Priority, TransportLevel};

/// Base rate by transport level, in whole currency units.
pub const BLS_BASE_RATE: f64 = 150.0;
pub const ALS_BASE_RATE: f64 = 250.0;
pub const CCT_BASE_RATE: f64 = 400.0;

/// Mileage threshold at which the distance multiplier starts growing.
pub const DISTANCE_MULTIPLIER_MILES: f64 = 25.0;

/// Per-mile operating cost, used to express miles saved as margin.
pub const PER_MILE_OPERATING_COST: f64 = 2.50;

pub fn base_rate(level: TransportLevel) -> f64 {
    match level {
        TransportLevel::Bls => BLS_BASE_RATE,
        TransportLevel::Als => ALS_BASE_RATE,
        TransportLevel::Cct => CCT_BASE_RATE,
    }
}

pub fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::Urgent => 1.5,
        Priority::High => 1.3,
        Priority::Medium => 1.1,
        Priority::Low => 1.0,
    }
}

/// Projected revenue for one transport, rounded to the nearest whole
/// currency unit.
///
/// Formula: `base_rate × max(1, distance/25) × priority_multiplier`. A
/// missing distance contributes the floor multiplier of 1.
pub fn revenue_potential(
    level: TransportLevel,
    priority: Priority,
    distance_miles: Option<f64>,
) -> u64 {
    let distance = distance_miles.unwrap_or(0.0).max(0.0);
    let distance_multiplier = (distance / DISTANCE_MULTIPLIER_MILES).max(1.0);
    (base_rate(level) * distance_multiplier * priority_multiplier(priority)).round() as u64
}
