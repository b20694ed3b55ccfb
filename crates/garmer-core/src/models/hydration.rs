// ABOUTME: Hydration model for daily water intake against a goal
// ABOUTME: Reads camelCase and snake_case keys since the stats endpoint varies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::defaults::HYDRATION_GOAL_ML;
use crate::constants::units::{ML_PER_FL_OZ, ML_PER_LITER};
use crate::conversions::goal_percentage;
use crate::normalize::{parse_calendar_date, parse_gmt_datetime, value_as_f64, ParseError, RawRecord};

/// Water intake for one day, in milliliters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HydrationData {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Logged intake
    pub total_intake_ml: f64,
    /// Daily goal
    pub goal_ml: f64,
    /// Estimated sweat loss from activities
    pub sweat_loss_ml: f64,
    /// Goal adjustment from activities
    pub activity_intake_ml: f64,
    /// Last logged entry (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_entry_timestamp: Option<DateTime<Utc>>,
}

impl HydrationData {
    /// Parse one element of the daily hydration stats response
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "HydrationData")?;
        let millis = |camel: &str, snake: &str, default: f64| {
            record
                .get_either(camel, snake)
                .and_then(value_as_f64)
                .unwrap_or(default)
        };

        Ok(Self {
            calendar_date: record
                .get_either("calendarDate", "calendar_date")
                .and_then(parse_calendar_date),
            total_intake_ml: millis("valueInML", "value_in_ml", 0.0),
            goal_ml: millis("goalInML", "goal_in_ml", HYDRATION_GOAL_ML),
            sweat_loss_ml: millis("sweatLossInML", "sweat_loss_in_ml", 0.0),
            activity_intake_ml: millis("activityIntakeInML", "activity_intake_in_ml", 0.0),
            last_entry_timestamp: record
                .get_either("lastEntryTimestampGMT", "last_entry_timestamp_gmt")
                .and_then(parse_gmt_datetime),
        })
    }

    /// Intake in liters
    #[must_use]
    pub fn total_intake_liters(&self) -> f64 {
        self.total_intake_ml / ML_PER_LITER
    }

    /// Intake in US fluid ounces
    #[must_use]
    pub fn total_intake_oz(&self) -> f64 {
        self.total_intake_ml / ML_PER_FL_OZ
    }

    /// Goal in liters
    #[must_use]
    pub fn goal_liters(&self) -> f64 {
        self.goal_ml / ML_PER_LITER
    }

    /// Goal in US fluid ounces
    #[must_use]
    pub fn goal_oz(&self) -> f64 {
        self.goal_ml / ML_PER_FL_OZ
    }

    /// Percentage of the goal achieved, 0 when the goal is 0
    #[must_use]
    pub fn goal_percentage(&self) -> f64 {
        goal_percentage(self.total_intake_ml, self.goal_ml)
    }

    /// Whether the goal was reached
    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.total_intake_ml >= self.goal_ml
    }

    /// Intake minus sweat loss
    #[must_use]
    pub fn net_intake_ml(&self) -> f64 {
        self.total_intake_ml - self.sweat_loss_ml
    }

    /// Intake still needed to reach the goal, never negative
    #[must_use]
    pub fn remaining_ml(&self) -> f64 {
        (self.goal_ml - self.total_intake_ml).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_response() {
        let raw = json!({"calendarDate": "2024-01-15", "valueInML": 1500, "goalInML": 3000, "sweatLossInML": 400});
        let hydration = HydrationData::from_raw(&raw).unwrap();
        assert!((hydration.goal_percentage() - 50.0).abs() < f64::EPSILON);
        assert!((hydration.remaining_ml() - 1500.0).abs() < f64::EPSILON);
        assert!((hydration.net_intake_ml() - 1100.0).abs() < f64::EPSILON);
        assert!((hydration.total_intake_liters() - 1.5).abs() < f64::EPSILON);
        assert!(!hydration.goal_reached());
    }

    #[test]
    fn test_snake_case_response_and_default_goal() {
        let raw = json!({"calendar_date": "2024-01-15", "value_in_ml": 2750});
        let hydration = HydrationData::from_raw(&raw).unwrap();
        assert!((hydration.goal_ml - 2500.0).abs() < f64::EPSILON);
        assert!(hydration.goal_reached());
        assert!((hydration.remaining_ml() - 0.0).abs() < f64::EPSILON);
        assert_eq!(hydration.calendar_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_zero_goal() {
        let hydration = HydrationData::from_raw(&json!({"valueInML": 100, "goalInML": 0})).unwrap();
        assert!((hydration.goal_percentage() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serialization_round_trip() {
        let raw = json!({"calendarDate": "2024-01-15", "valueInML": 1500, "goalInML": 3000});
        let hydration = HydrationData::from_raw(&raw).unwrap();
        let restored: HydrationData =
            serde_json::from_value(serde_json::to_value(&hydration).unwrap()).unwrap();
        assert_eq!(restored, hydration);
    }
}
