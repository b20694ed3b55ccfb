// ABOUTME: Body composition and weight extractor for the weight service endpoints
// ABOUTME: Provides per-day composition, day-view weight, weight ranges, and weight statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use garmer_core::constants::endpoints;
use garmer_core::errors::{AppError, AppResult};
use garmer_core::models::{BodyComposition, Weight};
use garmer_core::normalize::{format_calendar_date, RawRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{contain, contain_default, DateExtractor};
use crate::auth::SessionManager;

const WEIGHT_SUMMARIES_KEY: &str = "dailyWeightSummaries";

/// Weight statistics over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightStats {
    /// Number of measurements
    pub measurements: usize,
    /// Earliest measurement in kilograms
    pub start_weight_kg: Option<f64>,
    /// Latest measurement in kilograms
    pub end_weight_kg: Option<f64>,
    /// Lowest measurement in kilograms
    pub min_weight_kg: Option<f64>,
    /// Highest measurement in kilograms
    pub max_weight_kg: Option<f64>,
    /// Average measurement in kilograms
    pub avg_weight_kg: Option<f64>,
    /// Latest minus earliest
    pub weight_change_kg: Option<f64>,
}

impl WeightStats {
    /// Aggregate chronologically ordered measurements
    #[must_use]
    pub fn from_weights(weights: &[Weight]) -> Self {
        let (Some(first), Some(last)) = (weights.first(), weights.last()) else {
            return Self::default();
        };
        let kgs: Vec<f64> = weights.iter().map(Weight::weight_kg).collect();
        let start = first.weight_kg();
        let end = last.weight_kg();

        Self {
            measurements: weights.len(),
            start_weight_kg: Some(start),
            end_weight_kg: Some(end),
            min_weight_kg: kgs.iter().copied().reduce(f64::min),
            max_weight_kg: kgs.iter().copied().reduce(f64::max),
            avg_weight_kg: Some(kgs.iter().sum::<f64>() / kgs.len() as f64),
            weight_change_kg: Some(end - start),
        }
    }
}

/// Entries of the `dailyWeightSummaries` list, empty for `null`
fn weight_summaries(raw: &Value) -> AppResult<&[Value]> {
    if raw.is_null() {
        return Ok(&[]);
    }
    Ok(RawRecord::from_value(raw, "WeightRange")?.get_array(WEIGHT_SUMMARIES_KEY))
}

/// Body composition and weight
#[derive(Clone)]
pub struct BodyExtractor {
    session: Arc<SessionManager>,
}

impl BodyExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    async fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Value> {
        self.session
            .get(
                endpoints::WEIGHT_RANGE,
                &[
                    ("startDate", format_calendar_date(start)),
                    ("endDate", format_calendar_date(end)),
                ],
            )
            .await
    }

    /// Day-view average weight on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weight_for_date(&self, date: NaiveDate) -> AppResult<Option<Weight>> {
        contain("weight", date, self.fetch_day_view(date).await)
    }

    async fn fetch_day_view(&self, date: NaiveDate) -> AppResult<Option<Weight>> {
        let endpoint = format!(
            "{}/{}",
            endpoints::WEIGHT_DAY_VIEW,
            format_calendar_date(date)
        );
        let raw = self.session.get(&endpoint, &[]).await?;
        if raw.is_null() {
            return Ok(None);
        }
        let record = RawRecord::from_value(&raw, "WeightDayView")?;
        Ok(record
            .get_record("totalAverage")
            .and_then(|average| average.get_f64("weight"))
            .map(|grams| Weight::from_day_average(date, grams)))
    }

    /// Weight measurements in `start..=end`, oldest first
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weight_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Weight>> {
        contain_default("weight_range", self.fetch_weight_range(start, end).await)
    }

    async fn fetch_weight_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Weight>> {
        let raw = self.fetch_range(start, end).await?;
        let mut weights = weight_summaries(&raw)?
            .iter()
            .map(Weight::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        weights.sort_by_key(|weight| (weight.date, weight.timestamp));
        Ok(weights)
    }

    /// Most recent weight measurement
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_latest_weight(&self) -> AppResult<Option<Weight>> {
        contain_default("latest_weight", self.fetch_latest_weight().await)
    }

    async fn fetch_latest_weight(&self) -> AppResult<Option<Weight>> {
        let raw = self.session.get(endpoints::WEIGHT_LATEST, &[]).await?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(Weight::from_raw(&raw)?))
    }

    /// Weight statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weight_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<WeightStats> {
        let weights = self.get_weight_range(start, end).await?;
        Ok(WeightStats::from_weights(&weights))
    }
}

#[async_trait]
impl DateExtractor for BodyExtractor {
    type Item = BodyComposition;

    fn domain(&self) -> &'static str {
        "body_composition"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<BodyComposition>> {
        let raw = self.fetch_range(date, date).await?;
        weight_summaries(&raw)?
            .first()
            .map(|summary| BodyComposition::from_raw(summary).map_err(AppError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weight(grams: f64) -> Weight {
        Weight {
            weight_grams: grams,
            ..Weight::default()
        }
    }

    #[test]
    fn test_weight_stats() {
        let stats = WeightStats::from_weights(&[weight(80_000.0), weight(78_000.0), weight(79_000.0)]);
        assert_eq!(stats.measurements, 3);
        assert_eq!(stats.start_weight_kg, Some(80.0));
        assert_eq!(stats.end_weight_kg, Some(79.0));
        assert_eq!(stats.min_weight_kg, Some(78.0));
        assert_eq!(stats.max_weight_kg, Some(80.0));
        assert_eq!(stats.avg_weight_kg, Some(79.0));
        assert_eq!(stats.weight_change_kg, Some(-1.0));
    }

    #[test]
    fn test_weight_stats_empty() {
        let stats = WeightStats::from_weights(&[]);
        assert_eq!(stats.measurements, 0);
        assert!(stats.start_weight_kg.is_none());
        assert!(stats.weight_change_kg.is_none());
    }

    #[test]
    fn test_weight_summaries() {
        let raw = json!({"dailyWeightSummaries": [{"weight": 70000.0}]});
        assert_eq!(weight_summaries(&raw).unwrap().len(), 1);
        assert!(weight_summaries(&Value::Null).unwrap().is_empty());
        assert!(weight_summaries(&json!({})).unwrap().is_empty());
        assert!(weight_summaries(&json!([1, 2])).is_err());
    }
}
