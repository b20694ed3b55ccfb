// ABOUTME: Step tracking models with goals, floors, intensity minutes, and interval samples
// ABOUTME: Parsed from the user summary endpoint and its stepsSamples array
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_records;
use crate::constants::defaults::{FLOORS_GOAL, INTENSITY_MINUTES_GOAL, STEP_GOAL};
use crate::constants::units::{METERS_PER_KM, METERS_PER_MILE, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::conversions::goal_percentage;
use crate::normalize::{ParseError, RawRecord};

/// Steps counted over one interval (typically 15 minutes)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsSample {
    /// Interval start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Interval end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Steps in the interval
    pub steps: u64,
    /// Dominant activity level label (e.g. `sedentary`, `active`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
}

impl StepsSample {
    fn from_record(record: RawRecord<'_>) -> Self {
        Self {
            start_time: record.get_gmt_datetime("startGMT"),
            end_time: record.get_gmt_datetime("endGMT"),
            steps: record.get_u64_or("steps", 0),
            activity_type: record.get_string("primaryActivityLevel"),
        }
    }
}

/// Step data for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsData {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,

    /// Steps
    pub total_steps: u64,
    /// Step goal
    pub step_goal: u32,
    /// Distance in meters
    pub total_distance_meters: f64,

    /// Highly active time in seconds
    pub highly_active_seconds: u64,
    /// Active time in seconds
    pub active_seconds: u64,
    /// Sedentary time in seconds
    pub sedentary_seconds: u64,
    /// Sleeping time in seconds
    pub sleeping_seconds: u64,

    /// Floors climbed (fractional)
    pub floors_ascended: f64,
    /// Floors descended (fractional)
    pub floors_descended: f64,
    /// Floors goal
    pub floors_goal: u32,

    /// Moderate intensity minutes
    pub moderate_intensity_minutes: u32,
    /// Vigorous intensity minutes
    pub vigorous_intensity_minutes: u32,
    /// Weekly intensity minutes goal
    pub intensity_minutes_goal: u32,

    /// Interval samples through the day
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps_samples: Vec<StepsSample>,
}

impl StepsData {
    /// Parse a user summary response as step data
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "StepsData")?;

        Ok(Self {
            calendar_date: record.get_date("calendarDate"),
            total_steps: record.get_u64_or("totalSteps", 0),
            step_goal: record
                .get_u32("stepGoal")
                .or_else(|| record.get_u32("dailyStepGoal"))
                .unwrap_or(STEP_GOAL),
            total_distance_meters: record.get_f64_or("totalDistanceMeters", 0.0),
            highly_active_seconds: record.get_u64_or("highlyActiveSeconds", 0),
            active_seconds: record.get_u64_or("activeSeconds", 0),
            sedentary_seconds: record.get_u64_or("sedentarySeconds", 0),
            sleeping_seconds: record.get_u64_or("sleepingSeconds", 0),
            floors_ascended: record.get_f64_or("floorsAscended", 0.0),
            floors_descended: record.get_f64_or("floorsDescended", 0.0),
            floors_goal: record
                .get_u32("floorsGoal")
                .or_else(|| record.get_u32("floorsAscendedGoal"))
                .unwrap_or(FLOORS_GOAL),
            moderate_intensity_minutes: record.get_u32_or("moderateIntensityMinutes", 0),
            vigorous_intensity_minutes: record.get_u32_or("vigorousIntensityMinutes", 0),
            intensity_minutes_goal: record
                .get_u32_or("intensityMinutesGoal", INTENSITY_MINUTES_GOAL),
            steps_samples: parse_records(record.get_array("stepsSamples"), StepsSample::from_record),
        })
    }

    /// Percentage of the step goal achieved, 0 when the goal is 0
    #[must_use]
    pub fn goal_percentage(&self) -> f64 {
        goal_percentage(self.total_steps as f64, f64::from(self.step_goal))
    }

    /// Whether the step goal was reached
    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.total_steps >= u64::from(self.step_goal)
    }

    /// Distance in kilometers
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_meters / METERS_PER_KM
    }

    /// Distance in miles
    #[must_use]
    pub fn total_distance_miles(&self) -> f64 {
        self.total_distance_meters / METERS_PER_MILE
    }

    /// Highly active time in minutes
    #[must_use]
    pub fn highly_active_minutes(&self) -> f64 {
        self.highly_active_seconds as f64 / SECONDS_PER_MINUTE
    }

    /// Active time in minutes
    #[must_use]
    pub fn active_minutes(&self) -> f64 {
        self.active_seconds as f64 / SECONDS_PER_MINUTE
    }

    /// Sedentary time in hours
    #[must_use]
    pub fn sedentary_hours(&self) -> f64 {
        self.sedentary_seconds as f64 / SECONDS_PER_HOUR
    }

    /// Intensity minutes with vigorous time counted double
    #[must_use]
    pub const fn total_intensity_minutes(&self) -> u32 {
        self.moderate_intensity_minutes
            .saturating_add(self.vigorous_intensity_minutes.saturating_mul(2))
    }

    /// Whether the floors goal was reached
    #[must_use]
    pub fn floors_goal_reached(&self) -> bool {
        self.floors_ascended >= f64::from(self.floors_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_goal_tracking() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "totalSteps": 12_500,
            "dailyStepGoal": 10_000,
            "floorsAscended": 9.6,
            "moderateIntensityMinutes": 30,
            "vigorousIntensityMinutes": 10,
            "totalDistanceMeters": 9000
        });
        let steps = StepsData::from_raw(&raw).unwrap();
        assert_eq!(steps.step_goal, 10_000);
        assert!(steps.goal_reached());
        assert!((steps.goal_percentage() - 125.0).abs() < f64::EPSILON);
        assert!(!steps.floors_goal_reached());
        assert_eq!(steps.total_intensity_minutes(), 50);
        assert!((steps.total_distance_km() - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_goal_percentage() {
        let steps = StepsData::from_raw(&json!({"totalSteps": 500, "stepGoal": 0})).unwrap();
        assert!((steps.goal_percentage() - 0.0).abs() < f64::EPSILON);
        assert!(steps.goal_reached());
    }

    #[test]
    fn test_huge_intensity_minutes_saturate() {
        let raw = json!({"moderateIntensityMinutes": u32::MAX, "vigorousIntensityMinutes": 2_500_000_000_u64});
        let steps = StepsData::from_raw(&raw).unwrap();
        assert_eq!(steps.total_intensity_minutes(), u32::MAX);
    }

    #[test]
    fn test_interval_samples() {
        let raw = json!({
            "stepsSamples": [
                {"startGMT": "2024-01-15T08:00:00.0", "endGMT": "2024-01-15T08:15:00.0", "steps": 820, "primaryActivityLevel": "active"},
                "garbage",
                {"startGMT": "2024-01-15T08:15:00.0", "steps": null}
            ]
        });
        let steps = StepsData::from_raw(&raw).unwrap();
        assert_eq!(steps.steps_samples.len(), 2);
        assert_eq!(steps.steps_samples[0].steps, 820);
        assert_eq!(steps.steps_samples[0].activity_type.as_deref(), Some("active"));
        assert_eq!(steps.steps_samples[1].steps, 0);
    }

    #[test]
    fn test_serialization_round_trip() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "totalSteps": 8_400,
            "stepsSamples": [
                {"startGMT": "2024-01-15T08:00:00.0", "endGMT": "2024-01-15T08:15:00.0", "steps": 820}
            ]
        });
        let steps = StepsData::from_raw(&raw).unwrap();
        let restored: StepsData =
            serde_json::from_value(serde_json::to_value(&steps).unwrap()).unwrap();
        assert_eq!(restored, steps);
    }
}
