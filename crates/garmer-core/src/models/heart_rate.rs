// ABOUTME: Heart rate models with daily summary values, intraday samples, and training zones
// ABOUTME: Normalizes pair and object sample encodings from the daily heart rate endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_records;
use crate::constants::units::SECONDS_PER_MINUTE;
use crate::conversions::mean;
use crate::normalize::{
    classify_sample, parse_timestamp_ms, value_as_u32, ParseError, RawRecord, SampleShape,
};

/// One intraday heart rate reading; 0 marks a slot with no reading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Reading time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Beats per minute
    pub heart_rate: u32,
}

impl HeartRateSample {
    /// Normalize one element of `heartRateValues`
    #[must_use]
    pub fn from_element(element: &Value) -> Option<Self> {
        match classify_sample(element) {
            SampleShape::Pair { timestamp, value } => Some(Self {
                timestamp: parse_timestamp_ms(timestamp),
                heart_rate: value_as_u32(value).unwrap_or(0),
            }),
            SampleShape::Object(record) => Some(Self {
                timestamp: record.get_timestamp("timestamp"),
                heart_rate: record
                    .get_u32("heartRate")
                    .or_else(|| record.get_u32("value"))
                    .unwrap_or(0),
            }),
            SampleShape::Unrecognized => None,
        }
    }
}

/// A heart rate training zone and the time spent in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZone {
    /// Zone number (1-5)
    pub zone_number: u32,
    /// Display name
    pub zone_name: String,
    /// Lower boundary (BPM)
    pub min_hr: u32,
    /// Upper boundary (BPM)
    pub max_hr: u32,
    /// Time in zone in seconds
    pub time_in_zone_seconds: f64,
}

impl HeartRateZone {
    /// Parse one zone entry
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        RawRecord::from_value(raw, "HeartRateZone").map(Self::from_record)
    }

    pub(crate) fn from_record(record: RawRecord<'_>) -> Self {
        let zone_number = record.get_u32_or("zoneNumber", 0);
        Self {
            zone_number,
            zone_name: record
                .get_string("zoneName")
                .unwrap_or_else(|| format!("Zone {zone_number}")),
            min_hr: record.get_u32_or("zoneLowBoundary", 0),
            max_hr: record.get_u32_or("zoneHighBoundary", 0),
            time_in_zone_seconds: record.get_f64_or("secsInZone", 0.0),
        }
    }

    /// Time in zone in minutes
    #[must_use]
    pub fn time_in_zone_minutes(&self) -> f64 {
        self.time_in_zone_seconds / SECONDS_PER_MINUTE
    }
}

/// Heart rate data for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateData {
    /// Calendar date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_date: Option<NaiveDate>,
    /// Day start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// Day end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,

    /// Resting heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,
    /// Maximum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u32>,
    /// Minimum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_heart_rate: Option<u32>,
    /// Average heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,
    /// Seven-day average resting heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seven_days_avg_resting_hr: Option<u32>,

    /// Intraday readings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heart_rate_samples: Vec<HeartRateSample>,
    /// Training zones, when the response includes them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heart_rate_zones: Vec<HeartRateZone>,
}

impl HeartRateData {
    /// Parse a daily heart rate response
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "HeartRateData")?;

        Ok(Self {
            calendar_date: record.get_date("calendarDate"),
            start_timestamp: record.get_gmt_datetime("startTimestampGMT"),
            end_timestamp: record.get_gmt_datetime("endTimestampGMT"),
            resting_heart_rate: record.get_u32("restingHeartRate"),
            max_heart_rate: record.get_u32("maxHeartRate"),
            min_heart_rate: record.get_u32("minHeartRate"),
            avg_heart_rate: record.get_u32("averageHeartRate"),
            last_seven_days_avg_resting_hr: record.get_u32("lastSevenDaysAvgRestingHeartRate"),
            heart_rate_samples: record
                .get_array("heartRateValues")
                .iter()
                .filter_map(HeartRateSample::from_element)
                .collect(),
            heart_rate_zones: parse_records(
                record.get_array("heartRateZones"),
                HeartRateZone::from_record,
            ),
        })
    }

    /// Samples whose timestamp falls in `[start, end]`
    pub fn samples_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = &HeartRateSample> {
        self.heart_rate_samples.iter().filter(move |sample| {
            sample
                .timestamp
                .is_some_and(|timestamp| start <= timestamp && timestamp <= end)
        })
    }

    /// Mean of non-zero readings in `[start, end]`
    #[must_use]
    pub fn average_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<f64> {
        mean(
            self.samples_in_range(start, end)
                .filter(|sample| sample.heart_rate > 0)
                .map(|sample| f64::from(sample.heart_rate)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_mixed_sample_encodings() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "restingHeartRate": 52,
            "heartRateValues": [[1000, 60], [2000, null], {"timestamp": 3000, "heartRate": 90}, {"timestamp": 4000, "value": 70}, 5]
        });
        let hr = HeartRateData::from_raw(&raw).unwrap();
        assert_eq!(hr.resting_heart_rate, Some(52));
        assert_eq!(hr.heart_rate_samples.len(), 4);
        assert_eq!(hr.heart_rate_samples[1].heart_rate, 0);
        assert_eq!(hr.heart_rate_samples[2].heart_rate, 90);
        assert_eq!(hr.heart_rate_samples[3].heart_rate, 70);
    }

    #[test]
    fn test_range_queries_are_inclusive_and_skip_zero() {
        let raw = json!({"heartRateValues": [[1000, 60], [2000, null], [3000, 90], [4000, 100]]});
        let hr = HeartRateData::from_raw(&raw).unwrap();
        assert_eq!(hr.samples_in_range(ts(1000), ts(3000)).count(), 3);
        assert!((hr.average_in_range(ts(1000), ts(3000)).unwrap() - 75.0).abs() < f64::EPSILON);
        assert!(hr.average_in_range(ts(2000), ts(2500)).is_none());
    }

    #[test]
    fn test_zone_defaults() {
        let zone = HeartRateZone::from_raw(&json!({"zoneNumber": 3, "secsInZone": 600})).unwrap();
        assert_eq!(zone.zone_name, "Zone 3");
        assert!((zone.time_in_zone_minutes() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serialization_round_trip() {
        let raw = json!({
            "calendarDate": "2024-01-15",
            "restingHeartRate": 52,
            "heartRateValues": [[1000, 60], [2000, null]]
        });
        let hr = HeartRateData::from_raw(&raw).unwrap();
        let json = serde_json::to_value(&hr).unwrap();
        assert!(json.get("max_heart_rate").is_none());
        let restored: HeartRateData = serde_json::from_value(json).unwrap();
        assert_eq!(restored, hr);
    }
}
