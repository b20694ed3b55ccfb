// ABOUTME: Fitness activity models including Activity, Lap, and Split
// ABOUTME: Parses activity search and detail responses and derives distance, pace, and speed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_records;
use crate::constants::defaults::MIN_PACE_DISTANCE_METERS;
use crate::constants::units::{
    METERS_PER_KM, METERS_PER_MILE, MPS_TO_KMH, SECONDS_PER_MINUTE,
};
use crate::normalize::{parse_local_datetime, ParseError, RawRecord};

/// Fallback type key when the server sends none
const OTHER_ACTIVITY_TYPE: &str = "other";

/// A lap within an activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// Lap index as reported by the device
    pub lap_number: u32,
    /// Lap start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Lap end (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Distance in meters
    pub distance_meters: f64,
    /// Calories burned
    pub calories: f64,
    /// Average heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,
    /// Maximum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u32>,
    /// Average speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,
    /// Maximum speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// Average running cadence (steps/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
    /// Elevation gain in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    /// Elevation loss in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_loss: Option<f64>,
}

impl Lap {
    /// Parse one entry of the `lapDTOs` list
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        RawRecord::from_value(raw, "Lap").map(Self::from_record)
    }

    pub(crate) fn from_record(record: RawRecord<'_>) -> Self {
        Self {
            lap_number: record.get_u32_or("lapIndex", 0),
            start_time: record.get_gmt_datetime("startTimeGMT"),
            end_time: record.get_gmt_datetime("endTimeGMT"),
            duration_seconds: record.get_f64_or("duration", 0.0),
            distance_meters: record.get_f64_or("distance", 0.0),
            calories: record.get_f64_or("calories", 0.0),
            avg_heart_rate: record.get_u32("averageHR"),
            max_heart_rate: record.get_u32("maxHR"),
            avg_speed: record.get_f64("averageSpeed"),
            max_speed: record.get_f64("maxSpeed"),
            avg_cadence: record.get_f64("averageRunCadence"),
            elevation_gain: record.get_f64("elevationGain"),
            elevation_loss: record.get_f64("elevationLoss"),
        }
    }

    /// Distance in kilometers
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / METERS_PER_KM
    }
}

/// A split (per-kilometer or per-mile segment) within an activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// 1-based split position
    pub split_number: u32,
    /// Distance in meters
    pub distance_meters: f64,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Average pace in seconds per kilometer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace_seconds: Option<f64>,
    /// Average heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,
    /// Net elevation change in meters (gain minus loss)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_change: Option<f64>,
}

impl Split {
    fn from_record(split_number: u32, record: RawRecord<'_>) -> Self {
        let distance_meters = record.get_f64_or("distance", 0.0);
        let duration_seconds = record.get_f64_or("duration", 0.0);
        let gain = record.get_f64("elevationGain");
        let loss = record.get_f64("elevationLoss");
        let elevation_change = match (gain, loss) {
            (None, None) => None,
            (gain, loss) => Some(gain.unwrap_or(0.0) - loss.unwrap_or(0.0)),
        };

        Self {
            split_number,
            distance_meters,
            duration_seconds,
            avg_pace_seconds: (distance_meters > 0.0 && duration_seconds > 0.0)
                .then(|| duration_seconds / (distance_meters / METERS_PER_KM)),
            avg_heart_rate: record.get_u32("averageHR"),
            elevation_change,
        }
    }
}

/// A single recorded workout
///
/// Distances are stored in meters and durations in seconds; the `*_km`,
/// `*_miles`, and pace accessors derive everything else on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Server-assigned activity id
    pub activity_id: u64,
    /// User-visible name
    pub activity_name: String,
    /// Activity type (e.g. `running`)
    pub activity_type: String,
    /// Activity type key used for grouping
    pub activity_type_key: String,

    /// Start in the device's local wall-clock time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveDateTime>,
    /// Start (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time_gmt: Option<DateTime<Utc>>,
    /// Timer duration in seconds
    pub duration_seconds: f64,
    /// Wall-clock duration in seconds
    pub elapsed_duration: f64,
    /// Moving time in seconds
    pub moving_duration: f64,

    /// Distance in meters
    pub distance_meters: f64,
    /// Average speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,
    /// Maximum speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,

    /// Average heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,
    /// Maximum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u32>,
    /// Minimum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_heart_rate: Option<u32>,

    /// Total calories
    pub calories: f64,
    /// Active calories
    pub active_calories: f64,

    /// Elevation gain in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    /// Elevation loss in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_loss: Option<f64>,
    /// Lowest elevation in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_elevation: Option<f64>,
    /// Highest elevation in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_elevation: Option<f64>,

    /// Average running cadence (steps/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
    /// Maximum running cadence (steps/min)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cadence: Option<f64>,
    /// Average power (watts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_power: Option<f64>,
    /// Maximum power (watts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_power: Option<f64>,
    /// Normalized power (watts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_power: Option<f64>,

    /// Aerobic training effect (0.0 - 5.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aerobic_training_effect: Option<f64>,
    /// Anaerobic training effect (0.0 - 5.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anaerobic_training_effect: Option<f64>,
    /// Training effect label (e.g. `TEMPO`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_effect_label: Option<String>,

    /// Start latitude (degrees)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_latitude: Option<f64>,
    /// Start longitude (degrees)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_longitude: Option<f64>,
    /// End latitude (degrees)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_latitude: Option<f64>,
    /// End longitude (degrees)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_longitude: Option<f64>,

    /// Step count (walking and running)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u64>,

    /// Average strokes per length (swimming)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_stroke_count: Option<f64>,
    /// Total strokes (swimming)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_strokes: Option<u64>,
    /// Pool length in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_length: Option<f64>,
    /// Average SWOLF score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_swolf: Option<f64>,

    /// Laps, when the response embedded them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub laps: Vec<Lap>,
    /// Splits, when the response embedded them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<Split>,

    /// Recording device id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u64>,
}

impl Activity {
    /// Parse one activity from a search result element or a detail response
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when `raw` is not an object or has no `activityId`
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "Activity")?;
        let activity_id = record.get_u64("activityId").ok_or(ParseError::MissingField {
            entity: "Activity",
            field: "activityId",
        })?;

        // activityType is an object with a typeKey in search results, a bare string elsewhere
        let activity_type = record
            .get_record("activityType")
            .and_then(|nested| nested.get_string("typeKey"))
            .or_else(|| record.get_string("activityType"))
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| OTHER_ACTIVITY_TYPE.to_owned());
        let activity_type_key = record
            .get_string("activityTypeKey")
            .unwrap_or_else(|| activity_type.clone());

        let splits = record
            .get_array("splitSummaries")
            .iter()
            .filter_map(Value::as_object)
            .zip(1_u32..)
            .map(|(map, number)| Split::from_record(number, RawRecord::from_map(map)))
            .collect();

        Ok(Self {
            activity_id,
            activity_name: record.get_string("activityName").unwrap_or_default(),
            activity_type,
            activity_type_key,
            start_time: record.get("startTimeLocal").and_then(parse_local_datetime),
            start_time_gmt: record.get_gmt_datetime("startTimeGMT"),
            duration_seconds: record.get_f64_or("duration", 0.0),
            elapsed_duration: record.get_f64_or("elapsedDuration", 0.0),
            moving_duration: record.get_f64_or("movingDuration", 0.0),
            distance_meters: record.get_f64_or("distance", 0.0),
            avg_speed: record.get_f64("averageSpeed"),
            max_speed: record.get_f64("maxSpeed"),
            avg_heart_rate: record.get_u32("averageHR"),
            max_heart_rate: record.get_u32("maxHR"),
            min_heart_rate: record.get_u32("minHR"),
            calories: record.get_f64_or("calories", 0.0),
            active_calories: record.get_f64_or("activeCalories", 0.0),
            elevation_gain: record.get_f64("elevationGain"),
            elevation_loss: record.get_f64("elevationLoss"),
            min_elevation: record.get_f64("minElevation"),
            max_elevation: record.get_f64("maxElevation"),
            avg_cadence: record.get_f64("averageRunningCadenceInStepsPerMinute"),
            max_cadence: record.get_f64("maxRunningCadenceInStepsPerMinute"),
            avg_power: record.get_f64("avgPower"),
            max_power: record.get_f64("maxPower"),
            normalized_power: record.get_f64("normPower"),
            aerobic_training_effect: record.get_f64("aerobicTrainingEffect"),
            anaerobic_training_effect: record.get_f64("anaerobicTrainingEffect"),
            training_effect_label: record.get_string("trainingEffectLabel"),
            start_latitude: record.get_f64("startLatitude"),
            start_longitude: record.get_f64("startLongitude"),
            end_latitude: record.get_f64("endLatitude"),
            end_longitude: record.get_f64("endLongitude"),
            steps: record.get_u64("steps"),
            avg_stroke_count: record.get_f64("avgStrokes"),
            total_strokes: record.get_u64("strokes"),
            pool_length: record.get_f64("poolLength"),
            avg_swolf: record.get_f64("avgSwolf"),
            laps: parse_records(record.get_array("lapDTOs"), Lap::from_record),
            splits,
            device_id: record.get_u64("deviceId"),
        })
    }

    /// Distance in kilometers
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / METERS_PER_KM
    }

    /// Distance in miles
    #[must_use]
    pub fn distance_miles(&self) -> f64 {
        self.distance_meters / METERS_PER_MILE
    }

    /// Duration in minutes
    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / SECONDS_PER_MINUTE
    }

    /// Pace in minutes per kilometer
    ///
    /// Absent when the duration is not positive or the distance is below
    /// [`MIN_PACE_DISTANCE_METERS`], where the ratio stops being a pace.
    #[must_use]
    pub fn pace_per_km(&self) -> Option<f64> {
        self.has_pace()
            .then(|| self.duration_minutes() / self.distance_km())
    }

    /// Pace in minutes per mile, same definition domain as [`Self::pace_per_km`]
    #[must_use]
    pub fn pace_per_mile(&self) -> Option<f64> {
        self.has_pace()
            .then(|| self.duration_minutes() / self.distance_miles())
    }

    /// Average speed in km/h
    #[must_use]
    pub fn avg_speed_kmh(&self) -> Option<f64> {
        self.avg_speed.map(|speed| speed * MPS_TO_KMH)
    }

    /// Maximum speed in km/h
    #[must_use]
    pub fn max_speed_kmh(&self) -> Option<f64> {
        self.max_speed.map(|speed| speed * MPS_TO_KMH)
    }

    fn has_pace(&self) -> bool {
        self.distance_meters >= MIN_PACE_DISTANCE_METERS && self.duration_seconds > 0.0
    }
}
