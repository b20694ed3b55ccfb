// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Unit conversions, vendor defaults, and Garmin Connect endpoint paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

/// Unit conversion and measurement constants
pub mod units;

/// Garmin Connect API endpoint paths
pub mod endpoints;

/// Defaults applied when the server omits a goal or sentinel field
pub mod defaults {
    /// Daily step goal when the server omits one
    pub const STEP_GOAL: u32 = 10_000;
    /// Daily floors-ascended goal when the server omits one
    pub const FLOORS_GOAL: u32 = 10;
    /// Weekly intensity-minutes goal when the server omits one
    pub const INTENSITY_MINUTES_GOAL: u32 = 150;
    /// Daily hydration goal in milliliters when the server omits one
    pub const HYDRATION_GOAL_ML: f64 = 2500.0;
    /// Stress level recorded for a sample with no measurement
    pub const INVALID_STRESS_LEVEL: i32 = -1;
    /// Activities shorter than this distance report no pace
    pub const MIN_PACE_DISTANCE_METERS: f64 = 10.0;
}

/// Stress level category boundaries (inclusive upper bounds)
pub mod stress_thresholds {
    /// Upper bound of the rest category
    pub const REST_MAX: i32 = 25;
    /// Upper bound of the low category
    pub const LOW_MAX: i32 = 50;
    /// Upper bound of the medium category
    pub const MEDIUM_MAX: i32 = 75;
}
