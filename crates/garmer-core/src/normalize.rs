// ABOUTME: Response normalization primitives shared by every typed entity
// ABOUTME: Fallible field accessors, camel/snake probing, timestamps, and sample shape detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! # Response Normalizer
//!
//! Garmin Connect responses are loosely structured: the same concept may arrive
//! under camelCase or snake_case keys, integer metrics arrive as `142.0`,
//! intraday samples arrive as `[timestamp, value]` pairs or as objects, and any
//! field may be missing or explicitly `null`.
//!
//! Entities never index into raw JSON directly. They wrap the response in a
//! [`RawRecord`] and read every field through an accessor that returns `None`
//! when the field is absent, `null`, or of the wrong type. Only a structurally
//! unusable response (an object was required and something else arrived)
//! produces a [`ParseError`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::conversions::{f64_to_i64, f64_to_u32, f64_to_u64};
use crate::errors::{AppError, ErrorCode};

/// Date format used by every date-keyed endpoint
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Datetime layouts the API uses for string timestamps
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// A raw response did not match any recognized shape
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An object was required
    #[error("expected a JSON object for {entity}, found {found}")]
    NotAnObject {
        /// Entity being parsed
        entity: &'static str,
        /// JSON type that was found instead
        found: &'static str,
    },
    /// An array was required
    #[error("expected a JSON array for {entity}, found {found}")]
    NotAnArray {
        /// Entity being parsed
        entity: &'static str,
        /// JSON type that was found instead
        found: &'static str,
    },
    /// A field without a sensible default was missing
    #[error("{entity} is missing required field `{field}`")]
    MissingField {
        /// Entity being parsed
        entity: &'static str,
        /// Missing field name
        field: &'static str,
    },
}

impl From<ParseError> for AppError {
    fn from(error: ParseError) -> Self {
        Self::new(ErrorCode::InvalidFormat, error.to_string()).with_source(error)
    }
}

/// JSON type name for error messages
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a JSON number as f64
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Read a JSON number as i64, truncating floats
#[must_use]
pub fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(f64_to_i64))
}

/// Read a JSON number as u64, truncating floats and clamping negatives to zero
#[must_use]
pub fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(f64_to_u64))
}

/// Read a JSON number as u32, truncating floats and clamping to range
#[must_use]
pub fn value_as_u32(value: &Value) -> Option<u32> {
    value.as_f64().map(f64_to_u32)
}

/// Parse a millisecond epoch timestamp
///
/// Accepts integers, floats, and numeric strings. Anything else, including
/// `null` and non-numeric strings, is absent rather than epoch zero.
#[must_use]
pub fn parse_timestamp_ms(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(f64_to_i64))?,
        Value::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp_millis(millis)
}

/// Parse a GMT timestamp that may be epoch milliseconds or a datetime string
///
/// Activity, sleep-phase, and step-sample endpoints report GMT instants as
/// `2024-01-15 07:30:00` or `2024-01-15T07:30:00.0` strings.
#[must_use]
pub fn parse_gmt_datetime(value: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp_ms(value).or_else(|| {
        value
            .as_str()
            .and_then(parse_datetime_str)
            .map(|naive| naive.and_utc())
    })
}

/// Parse a local wall-clock timestamp (milliseconds or datetime string)
#[must_use]
pub fn parse_local_datetime(value: &Value) -> Option<NaiveDateTime> {
    parse_timestamp_ms(value)
        .map(|instant| instant.naive_utc())
        .or_else(|| value.as_str().and_then(parse_datetime_str))
}

fn parse_datetime_str(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Parse a `YYYY-MM-DD` calendar date
#[must_use]
pub fn parse_calendar_date(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|text| NaiveDate::parse_from_str(text.trim(), CALENDAR_DATE_FORMAT).ok())
}

/// Format a date the way every endpoint expects it
#[must_use]
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(CALENDAR_DATE_FORMAT).to_string()
}

/// Read-only view over one JSON object with fallible, typed accessors
///
/// Explicit `null` values are treated exactly like missing keys.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> RawRecord<'a> {
    /// Wrap a response that must be an object
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `value` is not a JSON object
    pub fn from_value(value: &'a Value, entity: &'static str) -> Result<Self, ParseError> {
        value
            .as_object()
            .map(Self::from_map)
            .ok_or(ParseError::NotAnObject {
                entity,
                found: json_type_name(value),
            })
    }

    /// Wrap an object map
    #[must_use]
    pub const fn from_map(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Field value, `None` when missing or `null`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    /// Look up a camelCase key first, then its snake_case spelling
    #[must_use]
    pub fn get_either(&self, camel: &str, snake: &str) -> Option<&'a Value> {
        self.get(camel).or_else(|| self.get(snake))
    }

    /// Whether a non-null value is present
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String field
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Owned string field
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_str(key).map(str::to_owned)
    }

    /// Boolean field
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Floating point field
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(value_as_f64)
    }

    /// Floating point field with a default for absent values
    #[must_use]
    pub fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    /// Signed integer field
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(value_as_i64)
    }

    /// Signed integer field with a default for absent values
    #[must_use]
    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    /// Unsigned integer field
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(value_as_u64)
    }

    /// Unsigned integer field with a default for absent values
    #[must_use]
    pub fn get_u64_or(&self, key: &str, default: u64) -> u64 {
        self.get_u64(key).unwrap_or(default)
    }

    /// Small unsigned integer field (heart rates, goals, scores)
    #[must_use]
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(value_as_u32)
    }

    /// Small unsigned integer field with a default for absent values
    #[must_use]
    pub fn get_u32_or(&self, key: &str, default: u32) -> u32 {
        self.get_u32(key).unwrap_or(default)
    }

    /// Walk nested objects, e.g. `["sleepScores", "overall", "value"]`
    #[must_use]
    pub fn get_nested(&self, path: &[&str]) -> Option<&'a Value> {
        let (first, rest) = path.split_first()?;
        rest.iter().try_fold(self.get(first)?, |current, key| {
            current.get(*key).filter(|value| !value.is_null())
        })
    }

    /// Nested object field
    #[must_use]
    pub fn get_record(&self, key: &str) -> Option<Self> {
        self.get(key).and_then(Value::as_object).map(Self::from_map)
    }

    /// Array field, empty when missing or not an array
    #[must_use]
    pub fn get_array(&self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Millisecond epoch timestamp field
    #[must_use]
    pub fn get_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(parse_timestamp_ms)
    }

    /// GMT timestamp field that may be milliseconds or a datetime string
    #[must_use]
    pub fn get_gmt_datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(parse_gmt_datetime)
    }

    /// `YYYY-MM-DD` field
    #[must_use]
    pub fn get_date(&self, key: &str) -> Option<NaiveDate> {
        self.get(key).and_then(parse_calendar_date)
    }
}

/// Shape of one element of an intraday sample array
#[derive(Debug, Clone, Copy)]
pub enum SampleShape<'a> {
    /// `[timestamp, value, ...]`
    Pair {
        /// First element
        timestamp: &'a Value,
        /// Second element (may be `null`)
        value: &'a Value,
    },
    /// An object with named fields
    Object(RawRecord<'a>),
    /// Anything else; callers skip it
    Unrecognized,
}

/// Detect the encoding of a single sample element
#[must_use]
pub fn classify_sample(element: &Value) -> SampleShape<'_> {
    match element {
        Value::Array(items) if items.len() >= 2 => SampleShape::Pair {
            timestamp: &items[0],
            value: &items[1],
        },
        Value::Object(map) => SampleShape::Object(RawRecord::from_map(map)),
        _ => SampleShape::Unrecognized,
    }
}

/// First object of a list response, `None` for an empty list
///
/// # Errors
///
/// Returns [`ParseError::NotAnArray`] when the response is not a list, or
/// [`ParseError::NotAnObject`] when its first element is not an object
pub fn first_record<'a>(
    value: &'a Value,
    entity: &'static str,
) -> Result<Option<RawRecord<'a>>, ParseError> {
    let items = value.as_array().ok_or(ParseError::NotAnArray {
        entity,
        found: json_type_name(value),
    })?;
    items
        .first()
        .map(|first| RawRecord::from_value(first, entity))
        .transpose()
}

/// Every element of a list response as an object
///
/// # Errors
///
/// Returns [`ParseError::NotAnArray`] when the response is not a list, or
/// [`ParseError::NotAnObject`] when any element is not an object
pub fn array_records<'a>(
    value: &'a Value,
    entity: &'static str,
) -> Result<Vec<RawRecord<'a>>, ParseError> {
    value
        .as_array()
        .ok_or(ParseError::NotAnArray {
            entity,
            found: json_type_name(value),
        })?
        .iter()
        .map(|item| RawRecord::from_value(item, entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_treated_as_absent() {
        let raw = json!({"totalSteps": null, "dailyStepGoal": 8000});
        let record = RawRecord::from_value(&raw, "test").unwrap();
        assert_eq!(record.get_u32_or("totalSteps", 0), 0);
        assert_eq!(record.get_u32_or("dailyStepGoal", 10_000), 8000);
        assert!(!record.has("totalSteps"));
    }

    #[test]
    fn test_get_either_prefers_camel_case() {
        let raw = json!({"valueInML": 1200, "value_in_ml": 900, "goal_in_ml": 3000});
        let record = RawRecord::from_value(&raw, "test").unwrap();
        assert_eq!(
            record.get_either("valueInML", "value_in_ml").and_then(value_as_i64),
            Some(1200)
        );
        assert_eq!(
            record.get_either("goalInML", "goal_in_ml").and_then(value_as_i64),
            Some(3000)
        );
        assert!(record.get_either("sweatLossInML", "sweat_loss_in_ml").is_none());
    }

    #[test]
    fn test_integer_fields_accept_floats() {
        let raw = json!({"restingHeartRate": 52.0, "floorsAscended": 12.6});
        let record = RawRecord::from_value(&raw, "test").unwrap();
        assert_eq!(record.get_u32("restingHeartRate"), Some(52));
        assert_eq!(record.get_i64("floorsAscended"), Some(12));
        assert!((record.get_f64("floorsAscended").unwrap() - 12.6).abs() < 1e-9);
    }

    #[test]
    fn test_timestamp_semantics() {
        let expected = DateTime::from_timestamp_millis(1_705_305_600_000);
        assert_eq!(parse_timestamp_ms(&json!(1_705_305_600_000_i64)), expected);
        assert_eq!(parse_timestamp_ms(&json!("1705305600000")), expected);
        assert!(parse_timestamp_ms(&json!("not-a-number")).is_none());
        assert!(parse_timestamp_ms(&Value::Null).is_none());
        assert!(parse_timestamp_ms(&json!(true)).is_none());
    }

    #[test]
    fn test_datetime_strings() {
        let gmt = parse_gmt_datetime(&json!("2024-01-15 07:30:00")).unwrap();
        assert_eq!(gmt.to_rfc3339(), "2024-01-15T07:30:00+00:00");
        let gmt = parse_gmt_datetime(&json!("2024-01-14T23:15:00.0")).unwrap();
        assert_eq!(gmt.to_rfc3339(), "2024-01-14T23:15:00+00:00");
        let local = parse_local_datetime(&json!("2024-01-15 08:30:00")).unwrap();
        assert_eq!(local.to_string(), "2024-01-15 08:30:00");
    }

    #[test]
    fn test_nested_lookup() {
        let raw = json!({"sleepScores": {"overall": {"value": 82}, "rem": {"value": null}}});
        let record = RawRecord::from_value(&raw, "test").unwrap();
        assert_eq!(
            record
                .get_nested(&["sleepScores", "overall", "value"])
                .and_then(value_as_u32),
            Some(82)
        );
        assert!(record.get_nested(&["sleepScores", "rem", "value"]).is_none());
        assert!(record.get_nested(&["sleepScores", "deep", "value"]).is_none());
    }

    #[test]
    fn test_sample_shapes() {
        assert!(matches!(
            classify_sample(&json!([1000, 20])),
            SampleShape::Pair { .. }
        ));
        assert!(matches!(
            classify_sample(&json!({"timestamp": 1000, "stressLevel": 20})),
            SampleShape::Object(_)
        ));
        assert!(matches!(
            classify_sample(&json!([1000])),
            SampleShape::Unrecognized
        ));
        assert!(matches!(
            classify_sample(&json!("x")),
            SampleShape::Unrecognized
        ));
    }

    #[test]
    fn test_structurally_unusable_responses() {
        let err = RawRecord::from_value(&json!([1, 2]), "SleepData").unwrap_err();
        assert_eq!(
            err,
            ParseError::NotAnObject {
                entity: "SleepData",
                found: "array"
            }
        );
        assert!(first_record(&json!({"a": 1}), "StressData").is_err());
        assert!(first_record(&json!([]), "StressData").unwrap().is_none());
        assert_eq!(array_records(&json!([{}, {}]), "Activity").unwrap().len(), 2);
        assert!(array_records(&json!([{}, 3]), "Activity").is_err());
    }

    #[test]
    fn test_parse_error_maps_to_invalid_format() {
        let error: AppError = ParseError::MissingField {
            entity: "Activity",
            field: "activityId",
        }
        .into();
        assert_eq!(error.code, ErrorCode::InvalidFormat);
        assert!(!error.is_authentication());
    }
}
