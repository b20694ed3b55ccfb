// ABOUTME: Whole-day rollup models combining steps, calories, heart rate, stress, and body battery
// ABOUTME: DailySummary mirrors the user summary endpoint, DailyStats is its compact projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::defaults::{FLOORS_GOAL, INTENSITY_MINUTES_GOAL, STEP_GOAL};
use crate::constants::units::METERS_PER_KM;
use crate::conversions::{goal_percentage, i64_to_i32};
use crate::normalize::{ParseError, RawRecord};

/// Compact daily statistics projected from a [`DailySummary`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Steps
    pub total_steps: u64,
    /// Step goal
    pub step_goal: u32,
    /// Distance in meters
    pub total_distance_meters: f64,
    /// Active calories
    pub active_calories: u64,
    /// Total calories
    pub total_calories: u64,
    /// Floors climbed
    pub floors_ascended: f64,
    /// Resting heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,
    /// Maximum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u32>,
    /// Minimum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_heart_rate: Option<u32>,
    /// Average stress level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_stress_level: Option<i32>,
    /// Maximum stress level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stress_level: Option<i32>,
    /// Highest body battery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_high: Option<i64>,
    /// Lowest body battery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_low: Option<i64>,
    /// Body battery charged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_charged: Option<i64>,
    /// Body battery drained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_drained: Option<i64>,
    /// Moderate intensity minutes
    pub moderate_intensity_minutes: u32,
    /// Vigorous intensity minutes
    pub vigorous_intensity_minutes: u32,
    /// Average waking respiration (breaths/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_respiration_rate: Option<f64>,
    /// Average SpO2 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_spo2: Option<f64>,
    /// Lowest SpO2 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_spo2: Option<f64>,
}

/// Whole-day rollup from the user summary endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Day start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Day end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,

    /// Steps
    pub total_steps: u64,
    /// Step goal
    pub daily_step_goal: u32,
    /// Distance in meters
    pub total_distance_meters: f64,

    /// Total calories burned
    pub total_kilocalories: u64,
    /// Active calories burned
    pub active_kilocalories: u64,
    /// Resting metabolic calories
    pub bmr_kilocalories: u64,
    /// Logged food intake
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_kilocalories: Option<i64>,
    /// Net calorie goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_calorie_goal: Option<i64>,
    /// Calories left against the goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_kilocalories: Option<i64>,

    /// Resting heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,
    /// Minimum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_heart_rate: Option<u32>,
    /// Maximum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u32>,
    /// Average heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,

    /// Average stress level (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_stress_level: Option<i32>,
    /// Maximum stress level (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stress_level: Option<i32>,
    /// Stressed time in seconds
    pub stress_duration: u64,
    /// Rest time in seconds
    pub rest_stress_duration: u64,

    /// Body battery charged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_charged_value: Option<i64>,
    /// Body battery drained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_drained_value: Option<i64>,
    /// Highest body battery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_highest_value: Option<i64>,
    /// Lowest body battery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_lowest_value: Option<i64>,
    /// Latest body battery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_most_recent_value: Option<i64>,

    /// Floors climbed (fractional)
    pub floors_ascended: f64,
    /// Floors descended (fractional)
    pub floors_descended: f64,
    /// Floors goal
    pub floors_ascended_goal: u32,

    /// Moderate intensity minutes
    pub moderate_intensity_minutes: u32,
    /// Vigorous intensity minutes
    pub vigorous_intensity_minutes: u32,
    /// Weekly intensity minutes goal
    pub intensity_minutes_goal: u32,

    /// Highly active time in seconds
    pub highly_active_seconds: u64,
    /// Active time in seconds
    pub active_seconds: u64,
    /// Sedentary time in seconds
    pub sedentary_seconds: u64,
    /// Sleeping time in seconds
    pub sleeping_seconds: u64,

    /// Average waking respiration (breaths/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_waking_respiration_value: Option<f64>,
    /// Highest respiration (breaths/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_respiration_value: Option<f64>,
    /// Lowest respiration (breaths/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_respiration_value: Option<f64>,

    /// Average SpO2 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_spo2_value: Option<f64>,
    /// Lowest SpO2 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_spo2_value: Option<f64>,
    /// Latest SpO2 (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_spo2_value: Option<f64>,

    /// HRV status label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv_status: Option<String>,
    /// Recorded activities
    pub activities_count: u32,
    /// Server-assigned summary id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_daily_summary_id: Option<u64>,
}

impl DailySummary {
    /// Parse a user summary response
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "DailySummary")?;
        let stress = |key: &str| record.get_i64(key).map(i64_to_i32);

        Ok(Self {
            calendar_date: record.get_date("calendarDate"),
            start_timestamp: record.get_gmt_datetime("startTimestampGMT"),
            end_timestamp: record.get_gmt_datetime("endTimestampGMT"),
            total_steps: record.get_u64_or("totalSteps", 0),
            daily_step_goal: record.get_u32_or("dailyStepGoal", STEP_GOAL),
            total_distance_meters: record.get_f64_or("totalDistanceMeters", 0.0),
            total_kilocalories: record.get_u64_or("totalKilocalories", 0),
            active_kilocalories: record.get_u64_or("activeKilocalories", 0),
            bmr_kilocalories: record.get_u64_or("bmrKilocalories", 0),
            consumed_kilocalories: record.get_i64("consumedKilocalories"),
            net_calorie_goal: record.get_i64("netCalorieGoal"),
            remaining_kilocalories: record.get_i64("remainingKilocalories"),
            resting_heart_rate: record.get_u32("restingHeartRate"),
            min_heart_rate: record.get_u32("minHeartRate"),
            max_heart_rate: record.get_u32("maxHeartRate"),
            avg_heart_rate: record.get_u32("averageHeartRate"),
            avg_stress_level: stress("averageStressLevel"),
            max_stress_level: stress("maxStressLevel"),
            stress_duration: record.get_u64_or("stressDuration", 0),
            rest_stress_duration: record.get_u64_or("restStressDuration", 0),
            body_battery_charged_value: record.get_i64("bodyBatteryChargedValue"),
            body_battery_drained_value: record.get_i64("bodyBatteryDrainedValue"),
            body_battery_highest_value: record.get_i64("bodyBatteryHighestValue"),
            body_battery_lowest_value: record.get_i64("bodyBatteryLowestValue"),
            body_battery_most_recent_value: record.get_i64("bodyBatteryMostRecentValue"),
            floors_ascended: record.get_f64_or("floorsAscended", 0.0),
            floors_descended: record.get_f64_or("floorsDescended", 0.0),
            floors_ascended_goal: record.get_u32_or("floorsAscendedGoal", FLOORS_GOAL),
            moderate_intensity_minutes: record.get_u32_or("moderateIntensityMinutes", 0),
            vigorous_intensity_minutes: record.get_u32_or("vigorousIntensityMinutes", 0),
            intensity_minutes_goal: record
                .get_u32_or("intensityMinutesGoal", INTENSITY_MINUTES_GOAL),
            highly_active_seconds: record.get_u64_or("highlyActiveSeconds", 0),
            active_seconds: record.get_u64_or("activeSeconds", 0),
            sedentary_seconds: record.get_u64_or("sedentarySeconds", 0),
            sleeping_seconds: record.get_u64_or("sleepingSeconds", 0),
            avg_waking_respiration_value: record.get_f64("avgWakingRespirationValue"),
            highest_respiration_value: record.get_f64("highestRespirationValue"),
            lowest_respiration_value: record.get_f64("lowestRespirationValue"),
            avg_spo2_value: record.get_f64("averageSpO2"),
            lowest_spo2_value: record.get_f64("lowestSpO2"),
            latest_spo2_value: record.get_f64("latestSpO2"),
            hrv_status: record.get_string("hrvStatus"),
            activities_count: record.get_u32_or("activitiesCount", 0),
            user_daily_summary_id: record.get_u64("userDailySummaryId"),
        })
    }

    /// Percentage of the step goal achieved, 0 when the goal is 0
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn step_goal_percentage(&self) -> f64 {
        goal_percentage(self.total_steps as f64, f64::from(self.daily_step_goal))
    }

    /// Intensity minutes with vigorous time counted double
    #[must_use]
    pub const fn total_intensity_minutes(&self) -> u32 {
        self.moderate_intensity_minutes
            .saturating_add(self.vigorous_intensity_minutes.saturating_mul(2))
    }

    /// Charged minus drained, when both are known
    #[must_use]
    pub fn body_battery_net_change(&self) -> Option<i64> {
        Some(
            self.body_battery_charged_value?
                .saturating_sub(self.body_battery_drained_value?),
        )
    }

    /// Distance in kilometers
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_meters / METERS_PER_KM
    }

    /// Project onto the compact [`DailyStats`] shape
    #[must_use]
    pub fn to_stats(&self) -> DailyStats {
        DailyStats {
            calendar_date: self.calendar_date,
            total_steps: self.total_steps,
            step_goal: self.daily_step_goal,
            total_distance_meters: self.total_distance_meters,
            active_calories: self.active_kilocalories,
            total_calories: self.total_kilocalories,
            floors_ascended: self.floors_ascended,
            resting_heart_rate: self.resting_heart_rate,
            max_heart_rate: self.max_heart_rate,
            min_heart_rate: self.min_heart_rate,
            avg_stress_level: self.avg_stress_level,
            max_stress_level: self.max_stress_level,
            body_battery_high: self.body_battery_highest_value,
            body_battery_low: self.body_battery_lowest_value,
            body_battery_charged: self.body_battery_charged_value,
            body_battery_drained: self.body_battery_drained_value,
            moderate_intensity_minutes: self.moderate_intensity_minutes,
            vigorous_intensity_minutes: self.vigorous_intensity_minutes,
            avg_respiration_rate: self.avg_waking_respiration_value,
            avg_spo2: self.avg_spo2_value,
            lowest_spo2: self.lowest_spo2_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_for_missing_and_null_counters() {
        let raw = json!({"calendarDate": "2024-01-15", "totalSteps": null, "dailyStepGoal": null});
        let summary = DailySummary::from_raw(&raw).unwrap();
        assert_eq!(summary.total_steps, 0);
        assert_eq!(summary.daily_step_goal, 10_000);
        assert_eq!(summary.floors_ascended_goal, 10);
        assert_eq!(summary.intensity_minutes_goal, 150);
        assert!(summary.resting_heart_rate.is_none());
        assert!(summary.body_battery_net_change().is_none());
    }

    #[test]
    fn test_intensity_minutes_weighting() {
        let raw = json!({"moderateIntensityMinutes": 30, "vigorousIntensityMinutes": 10});
        let summary = DailySummary::from_raw(&raw).unwrap();
        assert_eq!(summary.total_intensity_minutes(), 50);
    }

    #[test]
    fn test_huge_counters_saturate() {
        let raw = json!({
            "vigorousIntensityMinutes": 3_000_000_000_u64,
            "moderateIntensityMinutes": 10,
            "bodyBatteryChargedValue": i64::MAX,
            "bodyBatteryDrainedValue": -5
        });
        let summary = DailySummary::from_raw(&raw).unwrap();
        assert_eq!(summary.vigorous_intensity_minutes, 3_000_000_000);
        assert_eq!(summary.total_intensity_minutes(), u32::MAX);
        assert_eq!(summary.body_battery_net_change(), Some(i64::MAX));
    }

    #[test]
    fn test_goal_percentage_and_projection() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "totalSteps": 7500,
            "dailyStepGoal": 0,
            "totalKilocalories": 2400.0,
            "bodyBatteryChargedValue": 60,
            "bodyBatteryDrainedValue": 45,
            "floorsAscended": 12.5,
            "averageStressLevel": 32
        });
        let summary = DailySummary::from_raw(&raw).unwrap();
        assert!((summary.step_goal_percentage() - 0.0).abs() < f64::EPSILON);
        assert_eq!(summary.body_battery_net_change(), Some(15));

        let stats = summary.to_stats();
        assert_eq!(stats.total_steps, 7500);
        assert_eq!(stats.total_calories, 2400);
        assert_eq!(stats.avg_stress_level, Some(32));
        assert!((stats.floors_ascended - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(DailySummary::from_raw(&json!([])).is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "totalSteps": 9_876,
            "totalDistanceMeters": 7_250.5,
            "restingHeartRate": 49,
            "floorsAscended": 4.2,
            "bodyBatteryHighestValue": 88
        });
        let summary = DailySummary::from_raw(&raw).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("max_heart_rate").is_none());
        let restored: DailySummary = serde_json::from_value(json).unwrap();
        assert_eq!(restored, summary);
    }
}
