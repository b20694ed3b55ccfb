// ABOUTME: Stress extractor for the daily stress stats and body battery report endpoints
// ABOUTME: Provides valid-sample timeseries and range statistics that exclude unmeasured values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use garmer_core::constants::endpoints;
use garmer_core::constants::units::SECONDS_PER_HOUR;
use garmer_core::conversions::mean;
use garmer_core::errors::AppResult;
use garmer_core::models::{BodyBatteryReport, StressData};
use garmer_core::normalize::format_calendar_date;
use serde::{Deserialize, Serialize};

use super::{contain, first_element, DateExtractor};
use crate::auth::SessionManager;

/// Stress statistics over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressStats {
    /// Days with stress data
    pub days_with_data: usize,
    /// Average of the daily average levels, over days with a measured level
    pub avg_stress_level: Option<f64>,
    /// Average rest time per day in hours
    pub avg_rest_hours: f64,
    /// Average high-stress time per day in hours
    pub avg_high_stress_hours: f64,
}

impl StressStats {
    /// Aggregate days of stress data
    ///
    /// Days whose average is missing or not positive do not contribute to
    /// `avg_stress_level`.
    #[must_use]
    pub fn from_days(days: &[StressData]) -> Self {
        if days.is_empty() {
            return Self::default();
        }

        let count = days.len() as f64;
        let average_hours = |seconds: u64| seconds as f64 / count / SECONDS_PER_HOUR;

        Self {
            days_with_data: days.len(),
            avg_stress_level: mean(
                days.iter()
                    .filter_map(|day| day.avg_stress_level)
                    .filter(|level| *level > 0)
                    .map(f64::from),
            ),
            avg_rest_hours: average_hours(
                days.iter()
                    .map(|day| day.rest_stress_duration)
                    .fold(0, u64::saturating_add),
            ),
            avg_high_stress_hours: average_hours(
                days.iter()
                    .map(|day| day.high_stress_duration)
                    .fold(0, u64::saturating_add),
            ),
        }
    }
}

/// Daily stress and body battery
#[derive(Clone)]
pub struct StressExtractor {
    session: Arc<SessionManager>,
}

impl StressExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Timestamped valid readings on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_stress_timeseries(
        &self,
        date: NaiveDate,
    ) -> AppResult<Vec<(DateTime<Utc>, i32)>> {
        let Some(data) = self.get_for_date(date).await? else {
            return Ok(Vec::new());
        };
        Ok(data
            .valid_samples()
            .filter_map(|sample| sample.timestamp.map(|ts| (ts, sample.stress_level)))
            .collect())
    }

    /// Statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_stress_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<StressStats> {
        let days = self.get_for_date_range(start, end).await?;
        Ok(StressStats::from_days(&days))
    }

    /// Body battery report for `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_body_battery(&self, date: NaiveDate) -> AppResult<Option<BodyBatteryReport>> {
        contain("body_battery", date, self.fetch_body_battery(date).await)
    }

    async fn fetch_body_battery(&self, date: NaiveDate) -> AppResult<Option<BodyBatteryReport>> {
        let day = format_calendar_date(date);
        let raw = self
            .session
            .get(
                endpoints::BODY_BATTERY,
                &[("startDate", day.clone()), ("endDate", day)],
            )
            .await?;
        Ok(first_element(&raw, "BodyBatteryReport")?
            .map(BodyBatteryReport::from_raw)
            .transpose()?)
    }
}

#[async_trait]
impl DateExtractor for StressExtractor {
    type Item = StressData;

    fn domain(&self) -> &'static str {
        "stress"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<StressData>> {
        let day = format_calendar_date(date);
        let raw = self
            .session
            .get(&format!("{}/{day}/{day}", endpoints::DAILY_STRESS), &[])
            .await?;
        Ok(first_element(&raw, "StressData")?
            .map(StressData::from_raw)
            .transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_average_excludes_unmeasured_days() {
        let days = [
            StressData::from_raw(&json!({
                "avgStressLevel": 30, "restStressDuration": 36000, "highStressDuration": 3600
            }))
            .unwrap(),
            StressData::from_raw(&json!({
                "avg_stress_level": -1, "rest_stress_duration": 18000, "high_stress_duration": 0
            }))
            .unwrap(),
        ];
        let stats = StressStats::from_days(&days);
        assert_eq!(stats.days_with_data, 2);
        assert_eq!(stats.avg_stress_level, Some(30.0));
        assert!((stats.avg_rest_hours - 7.5).abs() < 1e-9);
        assert!((stats.avg_high_stress_hours - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty() {
        let stats = StressStats::from_days(&[]);
        assert_eq!(stats.days_with_data, 0);
        assert!(stats.avg_stress_level.is_none());
        assert!(stats.avg_rest_hours.abs() < f64::EPSILON);
    }
}
