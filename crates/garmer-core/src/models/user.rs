// ABOUTME: User profile, settings, and registered device models
// ABOUTME: Derives imperial height and weight plus BMI from the metric profile values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::defaults::{FLOORS_GOAL, INTENSITY_MINUTES_GOAL, STEP_GOAL};
use crate::constants::units::{CM_PER_INCH, INCHES_PER_FOOT, LBS_PER_KG};
use crate::conversions::f64_to_u32;
use crate::normalize::{ParseError, RawRecord};

/// Display preferences and personal goals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Preferred locale (e.g. `en`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<String>,
    /// `metric` or `statute_us`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_system: Option<String>,
    /// Date display format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Time display format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,

    /// Daily step goal
    pub step_goal: u32,
    /// Daily floors goal
    pub floors_goal: u32,
    /// Weekly intensity minutes goal
    pub intensity_minutes_goal: u32,
    /// Daily calorie goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_goal: Option<u32>,

    /// Configured maximum heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<u32>,
    /// Configured resting heart rate (BPM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,

    /// Usual bedtime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<String>,
    /// Usual wake time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
}

impl UserSettings {
    /// Parse a user-settings response, reading `userData` when nested
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let outer = RawRecord::from_value(raw, "UserSettings")?;
        Ok(Self::from_record(outer.get_record("userData").unwrap_or(outer)))
    }

    fn from_record(record: RawRecord<'_>) -> Self {
        // Sleep and wake times arrive as seconds after midnight or as strings
        let clock = |key: &str| {
            record.get_string(key).or_else(|| {
                record.get_u64(key).map(|seconds| {
                    format!("{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
                })
            })
        };

        Self {
            preferred_locale: record.get_string("preferredLocale"),
            measurement_system: record.get_string("measurementSystem"),
            date_format: record
                .get_string("dateFormat")
                .or_else(|| {
                    record
                        .get_record("dateFormat")
                        .and_then(|nested| nested.get_string("formatKey"))
                }),
            time_format: record.get_string("timeFormat"),
            step_goal: record.get_u32_or("stepGoal", STEP_GOAL),
            floors_goal: record.get_u32_or("floorsGoal", FLOORS_GOAL),
            intensity_minutes_goal: record
                .get_u32_or("intensityMinutesGoal", INTENSITY_MINUTES_GOAL),
            calories_goal: record.get_u32("caloriesGoal"),
            max_heart_rate: record.get_u32("maxHeartRate"),
            resting_heart_rate: record.get_u32("restingHeartRate"),
            sleep_time: clock("sleepTime"),
            wake_time: clock("wakeTime"),
        }
    }
}

/// Account identity and body metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Numeric profile id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<u64>,
    /// Account GUID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garmin_guid: Option<String>,
    /// Display name used in URL paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Login user name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Birth date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// Age in years
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    /// Height in centimeters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    /// Weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,

    /// Country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// IANA time zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Locale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Account creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<DateTime<Utc>>,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// Large avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url_large: Option<String>,

    /// Embedded settings, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
}

impl UserProfile {
    /// Parse a social profile response
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "UserProfile")?;

        Ok(Self {
            profile_id: record.get_u64("profileId").or_else(|| record.get_u64("id")),
            garmin_guid: record.get_string("garminGUID"),
            display_name: record.get_string("displayName"),
            full_name: record.get_string("fullName"),
            user_name: record.get_string("userName"),
            email: record.get_string("email"),
            gender: record.get_string("gender"),
            birth_date: record.get_date("birthDate"),
            age: record.get_u32("age"),
            height_cm: record.get_f64("height"),
            weight_kg: record.get_f64("weight"),
            country_code: record.get_string("countryCode"),
            time_zone: record.get_string("timeZone"),
            locale: record.get_string("locale"),
            registration_date: record
                .get_str("registrationDate")
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
                .map(|instant| instant.with_timezone(&Utc))
                .or_else(|| record.get_gmt_datetime("registrationDate")),
            profile_image_url: record.get_string("profileImageUrl"),
            profile_image_url_large: record.get_string("profileImageUrlLarge"),
            settings: record
                .get_record("userSettings")
                .or_else(|| record.get_record("settings"))
                .map(UserSettings::from_record),
        })
    }

    fn positive_height(&self) -> Option<f64> {
        self.height_cm.filter(|height| *height > 0.0)
    }

    fn positive_weight(&self) -> Option<f64> {
        self.weight_kg.filter(|weight| *weight > 0.0)
    }

    /// Height in inches
    #[must_use]
    pub fn height_inches(&self) -> Option<f64> {
        self.positive_height().map(|height| height / CM_PER_INCH)
    }

    /// Height as whole feet plus inches rounded to one decimal
    #[must_use]
    pub fn height_feet_inches(&self) -> Option<(u32, f64)> {
        let total = self.height_inches()?;
        let feet = (total / INCHES_PER_FOOT).floor();
        let inches = total - feet * INCHES_PER_FOOT;
        Some((f64_to_u32(feet), (inches * 10.0).round() / 10.0))
    }

    /// Weight in pounds
    #[must_use]
    pub fn weight_lbs(&self) -> Option<f64> {
        self.positive_weight().map(|weight| weight * LBS_PER_KG)
    }

    /// Body mass index from profile height and weight
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.positive_height()? / 100.0;
        Some(self.positive_weight()? / (height_m * height_m))
    }
}

/// A registered device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Device id, usable with the device settings endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u64>,
    /// User-assigned name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Product name (e.g. `Forerunner 965`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_display_name: Option<String>,
    /// Part number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    /// Serial number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl Device {
    /// Parse one element of the device registration list
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let record = RawRecord::from_value(raw, "Device")?;
        Ok(Self {
            device_id: record.get_u64("deviceId"),
            display_name: record.get_string("displayName"),
            product_display_name: record.get_string("productDisplayName"),
            part_number: record.get_string("partNumber"),
            serial_number: record
                .get_string("serialNumber")
                .or_else(|| record.get_u64("serialNumber").map(|serial| serial.to_string())),
        })
    }

    /// Best available label for display
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.product_display_name.as_deref())
            .unwrap_or("Unknown device")
    }
}
