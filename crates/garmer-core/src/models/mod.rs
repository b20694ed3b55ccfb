// ABOUTME: Typed health and activity entities built from normalized Garmin responses
// ABOUTME: Re-exports Activity, SleepData, DailySummary and the per-domain daily metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! # Data Models
//!
//! Every entity is a plain record with public fields, constructed by a
//! `from_raw(&Value) -> Result<Self, ParseError>` function and read through
//! derived accessors.
//!
//! ## Design Principles
//!
//! - **Native units at rest**: fields keep the server's unit (meters, seconds,
//!   grams, milliliters); conversions only happen in accessors
//! - **Absent is not zero**: optional metrics are `Option`, only cumulative
//!   counters default to zero when the server omits them
//! - **Null-omitted serialization**: `None` fields are skipped so exported JSON
//!   carries only what the server returned

mod activity;
mod body;
mod daily;
mod heart_rate;
mod hydration;
mod respiration;
mod sleep;
mod steps;
mod stress;
mod user;

pub use activity::{Activity, Lap, Split};
pub use body::{BodyComposition, Weight};
pub use daily::{DailyStats, DailySummary};
pub use heart_rate::{HeartRateData, HeartRateSample, HeartRateZone};
pub use hydration::HydrationData;
pub use respiration::{RespirationData, RespirationSample};
pub use sleep::{SleepData, SleepLevel, SleepMovement, SleepPhase};
pub use steps::{StepsData, StepsSample};
pub use stress::{BodyBatteryReport, BodyBatterySample, StressCategory, StressData, StressSample};
pub use user::{Device, UserProfile, UserSettings};

use serde_json::Value;

use crate::normalize::RawRecord;

/// Parse every object element of a nested list, skipping anything else
pub(crate) fn parse_records<T>(values: &[Value], parse: impl Fn(RawRecord<'_>) -> T) -> Vec<T> {
    values
        .iter()
        .filter_map(Value::as_object)
        .map(|map| parse(RawRecord::from_map(map)))
        .collect()
}
