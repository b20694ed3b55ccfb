// ABOUTME: Weight and body composition models from the weight service
// ABOUTME: Stores grams at rest and derives kilograms, pounds, and lean mass on read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::units::{GRAMS_PER_KG, LBS_PER_KG};
use crate::normalize::{ParseError, RawRecord};

/// Weight range summaries nest the measurement under `latestWeight`
fn measurement_record<'a>(
    raw: &'a Value,
    entity: &'static str,
) -> Result<(RawRecord<'a>, Option<NaiveDate>), ParseError> {
    let outer = RawRecord::from_value(raw, entity)?;
    let summary_date = outer
        .get_date("calendarDate")
        .or_else(|| outer.get_date("summaryDate"));
    let record = outer.get_record("latestWeight").unwrap_or(outer);
    Ok((record, record.get_date("calendarDate").or(summary_date)))
}

fn grams_to_kg(grams: f64) -> f64 {
    grams / GRAMS_PER_KG
}

/// One weight measurement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    /// Server-assigned sample id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_pk: Option<u64>,
    /// Measurement date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Measurement time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Weight in grams
    pub weight_grams: f64,
    /// Source label (e.g. `INDEX_SCALE`, `MANUAL`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

impl Weight {
    /// Parse a weight entry, unwrapping `latestWeight` when present
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let (record, date) = measurement_record(raw, "Weight")?;
        Ok(Self {
            sample_pk: record.get_u64("samplePk"),
            date,
            timestamp: record.get_timestamp("timestampGMT"),
            weight_grams: record.get_f64_or("weight", 0.0),
            source_type: record.get_string("sourceType"),
        })
    }

    /// Weight built from a day-view average
    #[must_use]
    pub fn from_day_average(date: NaiveDate, weight_grams: f64) -> Self {
        Self {
            date: Some(date),
            weight_grams,
            ..Self::default()
        }
    }

    /// Weight in kilograms
    #[must_use]
    pub fn weight_kg(&self) -> f64 {
        grams_to_kg(self.weight_grams)
    }

    /// Weight in pounds
    #[must_use]
    pub fn weight_lbs(&self) -> f64 {
        self.weight_kg() * LBS_PER_KG
    }
}

/// Weight plus smart-scale composition metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyComposition {
    /// Server-assigned sample id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_pk: Option<u64>,
    /// Measurement date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Measurement time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Weight in grams
    pub weight_grams: f64,

    /// Body fat (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    /// Body water (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_water_percentage: Option<f64>,
    /// Bone mass in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone_mass_grams: Option<f64>,
    /// Muscle mass in grams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_mass_grams: Option<f64>,
    /// Visceral fat rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visceral_fat_level: Option<u32>,

    /// Metabolic age in years
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metabolic_age: Option<u32>,
    /// Physique rating (1-9)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physique_rating: Option<u32>,
    /// Body mass index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,

    /// Source label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

impl BodyComposition {
    /// Parse a weight range summary entry
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when `raw` is not an object
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let (record, date) = measurement_record(raw, "BodyComposition")?;
        Ok(Self {
            sample_pk: record.get_u64("samplePk"),
            date,
            timestamp: record.get_timestamp("timestampGMT"),
            weight_grams: record.get_f64_or("weight", 0.0),
            body_fat_percentage: record.get_f64("bodyFat"),
            body_water_percentage: record.get_f64("bodyWater"),
            bone_mass_grams: record.get_f64("boneMass"),
            muscle_mass_grams: record.get_f64("muscleMass"),
            visceral_fat_level: record.get_u32("visceralFat"),
            metabolic_age: record.get_u32("metabolicAge"),
            physique_rating: record.get_u32("physiqueRating"),
            bmi: record.get_f64("bmi").or_else(|| record.get_f64("bMI")),
            source_type: record.get_string("sourceType"),
        })
    }

    /// Weight in kilograms
    #[must_use]
    pub fn weight_kg(&self) -> f64 {
        grams_to_kg(self.weight_grams)
    }

    /// Weight in pounds
    #[must_use]
    pub fn weight_lbs(&self) -> f64 {
        self.weight_kg() * LBS_PER_KG
    }

    /// Bone mass in kilograms, absent when not measured
    #[must_use]
    pub fn bone_mass_kg(&self) -> Option<f64> {
        self.bone_mass_grams
            .filter(|grams| *grams > 0.0)
            .map(grams_to_kg)
    }

    /// Muscle mass in kilograms, absent when not measured
    #[must_use]
    pub fn muscle_mass_kg(&self) -> Option<f64> {
        self.muscle_mass_grams
            .filter(|grams| *grams > 0.0)
            .map(grams_to_kg)
    }

    /// Weight minus fat mass, when body fat is known
    #[must_use]
    pub fn lean_body_mass_kg(&self) -> Option<f64> {
        let fat = self.body_fat_percentage?;
        let weight = self.weight_kg();
        Some(weight - weight * fat / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weight_conversions() {
        let weight = Weight::from_raw(&json!({"weight": 70000, "calendarDate": "2024-01-15"})).unwrap();
        assert!((weight.weight_kg() - 70.0).abs() < f64::EPSILON);
        assert!((weight.weight_lbs() - 154.32).abs() < 0.01);
        assert_eq!(weight.date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_range_summary_unwraps_latest_weight() {
        let raw = json!({
            "summaryDate": "2024-01-14",
            "latestWeight": {"samplePk": 77, "weight": 81_250.0, "bodyFat": 20.0, "bmi": 24.1, "boneMass": 0}
        });
        let body = BodyComposition::from_raw(&raw).unwrap();
        assert_eq!(body.sample_pk, Some(77));
        assert_eq!(body.date, NaiveDate::from_ymd_opt(2024, 1, 14));
        assert!((body.lean_body_mass_kg().unwrap() - 65.0).abs() < 1e-9);
        assert!(body.bone_mass_kg().is_none());
        assert!(body.muscle_mass_kg().is_none());
        assert!((body.bmi.unwrap() - 24.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_legacy_bmi_key() {
        let body = BodyComposition::from_raw(&json!({"weight": 1, "bMI": 22.0})).unwrap();
        assert!((body.bmi.unwrap() - 22.0).abs() < f64::EPSILON);
        assert!(body.lean_body_mass_kg().is_none());
    }

    #[test]
    fn test_day_average_weight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let weight = Weight::from_day_average(date, 72_500.0);
        assert_eq!(weight.date, Some(date));
        assert!((weight.weight_kg() - 72.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serialization_round_trip() {
        let weight = Weight::from_raw(&json!({"weight": 70_400.0, "calendarDate": "2024-01-15"})).unwrap();
        let restored: Weight =
            serde_json::from_value(serde_json::to_value(&weight).unwrap()).unwrap();
        assert_eq!(restored, weight);

        let raw = json!({
            "summaryDate": "2024-01-14",
            "latestWeight": {"samplePk": 77, "weight": 81_250.0, "bodyFat": 20.0}
        });
        let body = BodyComposition::from_raw(&raw).unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("muscle_mass_grams").is_none());
        let restored: BodyComposition = serde_json::from_value(json).unwrap();
        assert_eq!(restored, body);
    }
}
