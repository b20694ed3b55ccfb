// ABOUTME: Respiration rate model with waking and sleeping averages and intraday samples
// ABOUTME: Accepts pair and object sample encodings from the daily respiration endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{
    classify_sample, parse_timestamp_ms, value_as_f64, ParseError, RawRecord, SampleShape,
};

/// One breathing-rate reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespirationSample {
    /// Reading time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Breaths per minute, absent for an empty slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiration_value: Option<f64>,
}

impl RespirationSample {
    /// Normalize one element of `respirationValuesArray`
    #[must_use]
    pub fn from_element(element: &Value) -> Option<Self> {
        match classify_sample(element) {
            SampleShape::Pair { timestamp, value } => Some(Self {
                timestamp: parse_timestamp_ms(timestamp),
                respiration_value: value_as_f64(value),
            }),
            SampleShape::Object(record) => Some(Self {
                timestamp: record.get_gmt_datetime("startTimeGMT"),
                respiration_value: record.get_f64("respirationValue"),
            }),
            SampleShape::Unrecognized => None,
        }
    }

    /// Whether the slot holds a reading
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.respiration_value.is_some()
    }
}

/// Respiration data for one day, in breaths per minute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespirationData {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Day start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Day end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Average while awake
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_waking_respiration: Option<f64>,
    /// Average while asleep
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_sleeping_respiration: Option<f64>,
    /// Highest reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_respiration: Option<f64>,
    /// Lowest reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_respiration: Option<f64>,
    /// Intraday readings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub respiration_samples: Vec<RespirationSample>,
}

impl RespirationData {
    /// Parse a daily respiration response
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "RespirationData")?;

        Ok(Self {
            calendar_date: record.get_date("calendarDate"),
            start_timestamp: record.get_gmt_datetime("startTimestampGMT"),
            end_timestamp: record.get_gmt_datetime("endTimestampGMT"),
            avg_waking_respiration: record.get_f64("avgWakingRespirationValue"),
            avg_sleeping_respiration: record.get_f64("avgSleepingRespirationValue"),
            highest_respiration: record.get_f64("highestRespirationValue"),
            lowest_respiration: record.get_f64("lowestRespirationValue"),
            respiration_samples: record
                .get_array("respirationValuesArray")
                .iter()
                .filter_map(RespirationSample::from_element)
                .collect(),
        })
    }

    /// Samples holding a reading
    pub fn valid_samples(&self) -> impl Iterator<Item = &RespirationSample> {
        self.respiration_samples.iter().filter(|sample| sample.is_valid())
    }

    /// Highest minus lowest, when both are known and non-zero
    #[must_use]
    pub fn respiration_range(&self) -> Option<f64> {
        let highest = self.highest_respiration.filter(|value| *value != 0.0)?;
        let lowest = self.lowest_respiration.filter(|value| *value != 0.0)?;
        Some(highest - lowest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_samples_and_range() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "highestRespirationValue": 21.0,
            "lowestRespirationValue": 11.5,
            "respirationValuesArray": [[1000, 14.0], [2000, null], {"startTimeGMT": 3000, "respirationValue": 15.5}]
        });
        let respiration = RespirationData::from_raw(&raw).unwrap();
        assert_eq!(respiration.respiration_samples.len(), 3);
        assert_eq!(respiration.valid_samples().count(), 2);
        assert!((respiration.respiration_range().unwrap() - 9.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_range_requires_both_bounds() {
        let respiration =
            RespirationData::from_raw(&json!({"highestRespirationValue": 20.0})).unwrap();
        assert!(respiration.respiration_range().is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "avgWakingRespirationValue": 14.5,
            "respirationValuesArray": [[1000, 14.0], [2000, null]]
        });
        let respiration = RespirationData::from_raw(&raw).unwrap();
        let json = serde_json::to_value(&respiration).unwrap();
        assert!(json.get("lowest_respiration").is_none());
        let restored: RespirationData = serde_json::from_value(json).unwrap();
        assert_eq!(restored, respiration);
    }
}
