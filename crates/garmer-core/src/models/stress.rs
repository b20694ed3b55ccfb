// ABOUTME: Stress level models with intraday samples and body battery reports
// ABOUTME: Normalizes pair and object sample encodings and keeps invalid samples out of averages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::defaults::INVALID_STRESS_LEVEL;
use crate::constants::stress_thresholds::{LOW_MAX, MEDIUM_MAX, REST_MAX};
use crate::constants::units::SECONDS_PER_HOUR;
use crate::conversions::{i64_to_i32, mean};
use crate::normalize::{
    classify_sample, parse_calendar_date, parse_gmt_datetime, parse_timestamp_ms, value_as_i64,
    value_as_u64, ParseError, RawRecord, SampleShape,
};

/// Stress band of a single measurement
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressCategory {
    /// No valid measurement
    Unmeasured,
    /// 0-25
    Rest,
    /// 26-50
    Low,
    /// 51-75
    Medium,
    /// 76-100
    High,
}

impl StressCategory {
    /// Band for a stress level; negative levels are unmeasured
    #[must_use]
    pub const fn from_level(level: i32) -> Self {
        if level < 0 {
            Self::Unmeasured
        } else if level <= REST_MAX {
            Self::Rest
        } else if level <= LOW_MAX {
            Self::Low
        } else if level <= MEDIUM_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unmeasured => "unmeasured",
            Self::Rest => "rest",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One intraday stress measurement
///
/// A level of `-1` marks a slot where the device recorded no valid value.
/// Such samples are kept so the sample count stays aligned with the
/// measurement cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressSample {
    /// Measurement time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Stress level 0-100, or -1 when unmeasured
    pub stress_level: i32,
}

impl Default for StressSample {
    fn default() -> Self {
        Self {
            timestamp: None,
            stress_level: INVALID_STRESS_LEVEL,
        }
    }
}

impl StressSample {
    /// Normalize one element of `stressValuesArray`
    ///
    /// Returns `None` only for elements that are neither a pair nor an object.
    #[must_use]
    pub fn from_element(element: &Value) -> Option<Self> {
        match classify_sample(element) {
            SampleShape::Pair { timestamp, value } => Some(Self {
                timestamp: parse_timestamp_ms(timestamp),
                stress_level: level_or_invalid(value_as_i64(value)),
            }),
            SampleShape::Object(record) => Some(Self {
                timestamp: record.get_timestamp("timestamp"),
                stress_level: level_or_invalid(record.get_i64("stressLevel")),
            }),
            SampleShape::Unrecognized => None,
        }
    }

    /// Whether the device recorded a real value
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.stress_level >= 0
    }

    /// Stress band
    #[must_use]
    pub const fn category(&self) -> StressCategory {
        StressCategory::from_level(self.stress_level)
    }
}

fn level_or_invalid(level: Option<i64>) -> i32 {
    level.map_or(INVALID_STRESS_LEVEL, i64_to_i32)
}

/// Stress data for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressData {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Day start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Day end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,

    /// Overall stress level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_stress_level: Option<i32>,
    /// Average stress level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_stress_level: Option<i32>,
    /// Maximum stress level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stress_level: Option<i32>,

    /// Rest time in seconds
    pub rest_stress_duration: u64,
    /// Low stress time in seconds
    pub low_stress_duration: u64,
    /// Medium stress time in seconds
    pub medium_stress_duration: u64,
    /// High stress time in seconds
    pub high_stress_duration: u64,
    /// Time during recorded activities in seconds
    pub activity_stress_duration: u64,
    /// Uncategorized time in seconds
    pub uncategorized_stress_duration: u64,

    /// Body battery charged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_charged: Option<i64>,
    /// Body battery drained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_battery_drained: Option<i64>,

    /// Intraday samples, including invalid ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stress_samples: Vec<StressSample>,
}

impl StressData {
    /// Parse one element of the daily stress stats response
    ///
    /// Keys are read in camelCase first, then snake_case.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "StressData")?;
        let level = |camel: &str, snake: &str| {
            record.get_either(camel, snake).and_then(value_as_i64).map(i64_to_i32)
        };
        let duration = |camel: &str, snake: &str| {
            record
                .get_either(camel, snake)
                .and_then(value_as_u64)
                .unwrap_or(0)
        };

        Ok(Self {
            calendar_date: record
                .get_either("calendarDate", "calendar_date")
                .and_then(parse_calendar_date),
            start_timestamp: record
                .get_either("startTimestampGMT", "start_timestamp_gmt")
                .and_then(parse_gmt_datetime),
            end_timestamp: record
                .get_either("endTimestampGMT", "end_timestamp_gmt")
                .and_then(parse_gmt_datetime),
            overall_stress_level: level("overallStressLevel", "overall_stress_level"),
            avg_stress_level: level("avgStressLevel", "avg_stress_level"),
            max_stress_level: level("maxStressLevel", "max_stress_level"),
            rest_stress_duration: duration("restStressDuration", "rest_stress_duration"),
            low_stress_duration: duration("lowStressDuration", "low_stress_duration"),
            medium_stress_duration: duration("mediumStressDuration", "medium_stress_duration"),
            high_stress_duration: duration("highStressDuration", "high_stress_duration"),
            activity_stress_duration: duration(
                "activityStressDuration",
                "activity_stress_duration",
            ),
            uncategorized_stress_duration: duration(
                "uncategorizedStressDuration",
                "uncategorized_stress_duration",
            ),
            body_battery_charged: record
                .get_either("bodyBatteryChargedValue", "body_battery_charged_value")
                .and_then(value_as_i64),
            body_battery_drained: record
                .get_either("bodyBatteryDrainedValue", "body_battery_drained_value")
                .and_then(value_as_i64),
            stress_samples: record
                .get_array("stressValuesArray")
                .iter()
                .filter_map(StressSample::from_element)
                .collect(),
        })
    }

    /// Samples with a real measurement
    pub fn valid_samples(&self) -> impl Iterator<Item = &StressSample> {
        self.stress_samples.iter().filter(|sample| sample.is_valid())
    }

    /// Mean level over valid samples only; invalid slots never count as zero
    #[must_use]
    pub fn average_sample_level(&self) -> Option<f64> {
        mean(self.valid_samples().map(|sample| f64::from(sample.stress_level)))
    }

    /// Rest time in hours
    #[must_use]
    pub fn rest_duration_hours(&self) -> f64 {
        self.rest_stress_duration as f64 / SECONDS_PER_HOUR
    }

    /// Low stress time in hours
    #[must_use]
    pub fn low_stress_hours(&self) -> f64 {
        self.low_stress_duration as f64 / SECONDS_PER_HOUR
    }

    /// Medium stress time in hours
    #[must_use]
    pub fn medium_stress_hours(&self) -> f64 {
        self.medium_stress_duration as f64 / SECONDS_PER_HOUR
    }

    /// High stress time in hours
    #[must_use]
    pub fn high_stress_hours(&self) -> f64 {
        self.high_stress_duration as f64 / SECONDS_PER_HOUR
    }

    /// Rest, low, medium, and high time combined, in hours
    #[must_use]
    pub fn total_measured_duration_hours(&self) -> f64 {
        let total = self
            .rest_stress_duration
            .saturating_add(self.low_stress_duration)
            .saturating_add(self.medium_stress_duration)
            .saturating_add(self.high_stress_duration);
        total as f64 / SECONDS_PER_HOUR
    }
}

/// One body battery reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyBatterySample {
    /// Reading time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Level 0-100
    pub level: i64,
}

/// Daily body battery report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyBatteryReport {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Energy gained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charged: Option<i64>,
    /// Energy spent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drained: Option<i64>,
    /// Report window start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Report window end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Readings with a level, in report order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<BodyBatterySample>,
}

impl BodyBatteryReport {
    /// Parse one element of the daily body battery report
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "BodyBatteryReport")?;
        let samples = record
            .get_array("bodyBatteryValuesArray")
            .iter()
            .filter_map(|element| match classify_sample(element) {
                SampleShape::Pair { timestamp, value } => {
                    value_as_i64(value).map(|level| BodyBatterySample {
                        timestamp: parse_timestamp_ms(timestamp),
                        level,
                    })
                }
                SampleShape::Object(_) | SampleShape::Unrecognized => None,
            })
            .collect();

        Ok(Self {
            calendar_date: record.get_date("date"),
            charged: record.get_i64("charged"),
            drained: record.get_i64("drained"),
            start_timestamp: record.get_gmt_datetime("startTimestampGMT"),
            end_timestamp: record.get_gmt_datetime("endTimestampGMT"),
            samples,
        })
    }

    /// Charged minus drained, when both are known
    #[must_use]
    pub fn net_change(&self) -> Option<i64> {
        Some(self.charged?.saturating_sub(self.drained?))
    }

    /// Highest reading of the day
    #[must_use]
    pub fn highest_level(&self) -> Option<i64> {
        self.samples.iter().map(|sample| sample.level).max()
    }

    /// Lowest reading of the day
    #[must_use]
    pub fn lowest_level(&self) -> Option<i64> {
        self.samples.iter().map(|sample| sample.level).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pair_samples_with_null_become_invalid() {
        let raw = json!({"stressValuesArray": [[1000, 20], [2000, null], [3000, 80]]});
        let stress = StressData::from_raw(&raw).unwrap();
        assert_eq!(stress.stress_samples.len(), 3);
        assert_eq!(stress.stress_samples[1].stress_level, -1);
        assert!(!stress.stress_samples[1].is_valid());
        assert!(stress.stress_samples[0].is_valid());
        assert!(stress.stress_samples[2].is_valid());
        assert_eq!(
            stress.stress_samples[0].timestamp,
            DateTime::from_timestamp_millis(1000)
        );
    }

    #[test]
    fn test_average_excludes_invalid_samples() {
        let raw = json!({"stressValuesArray": [[1000, 20], [2000, null], [3000, 80]]});
        let stress = StressData::from_raw(&raw).unwrap();
        assert_eq!(stress.valid_samples().count(), 2);
        assert!((stress.average_sample_level().unwrap() - 50.0).abs() < f64::EPSILON);
        assert!(StressData::default().average_sample_level().is_none());
    }

    #[test]
    fn test_huge_durations_saturate() {
        let raw = json!({"restStressDuration": 1e30, "lowStressDuration": 5});
        let stress = StressData::from_raw(&raw).unwrap();
        assert_eq!(stress.rest_stress_duration, u64::MAX);
        let expected = u64::MAX as f64 / SECONDS_PER_HOUR;
        assert!((stress.total_measured_duration_hours() - expected).abs() < 1.0);
    }

    #[test]
    fn test_snake_case_keys_and_object_samples() {
        let raw = json!({
            "calendar_date": "2024-01-15",
            "avg_stress_level": 31,
            "rest_stress_duration": 7200,
            "body_battery_charged_value": 55,
            "stressValuesArray": [{"timestamp": 1000, "stressLevel": 40}, {"timestamp": 2000}]
        });
        let stress = StressData::from_raw(&raw).unwrap();
        assert_eq!(stress.calendar_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(stress.avg_stress_level, Some(31));
        assert!((stress.rest_duration_hours() - 2.0).abs() < f64::EPSILON);
        assert_eq!(stress.body_battery_charged, Some(55));
        assert_eq!(stress.stress_samples[1].stress_level, -1);
    }

    #[test]
    fn test_categories() {
        assert_eq!(StressCategory::from_level(-1), StressCategory::Unmeasured);
        assert_eq!(StressCategory::from_level(25), StressCategory::Rest);
        assert_eq!(StressCategory::from_level(26), StressCategory::Low);
        assert_eq!(StressCategory::from_level(75), StressCategory::Medium);
        assert_eq!(StressCategory::from_level(90).as_str(), "high");
    }

    #[test]
    fn test_body_battery_report() {
        let raw = json!({
            "date": "2024-01-15",
            "charged": 62,
            "drained": 48,
            "bodyBatteryValuesArray": [[1000, 35], [2000, null], [3000, 97], [4000, 60]]
        });
        let report = BodyBatteryReport::from_raw(&raw).unwrap();
        assert_eq!(report.net_change(), Some(14));
        assert_eq!(report.samples.len(), 3);
        assert_eq!(report.highest_level(), Some(97));
        assert_eq!(report.lowest_level(), Some(35));
    }

    #[test]
    fn test_serialization_round_trip_keeps_invalid_samples() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "avgStressLevel": 31,
            "stressValuesArray": [[1000, 20], [2000, null]]
        });
        let stress = StressData::from_raw(&raw).unwrap();
        let json = serde_json::to_value(&stress).unwrap();
        assert!(json.get("max_stress_level").is_none());
        let restored: StressData = serde_json::from_value(json).unwrap();
        assert_eq!(restored, stress);
        assert_eq!(restored.valid_samples().count(), 1);
    }
}
