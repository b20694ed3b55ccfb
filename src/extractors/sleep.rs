// ABOUTME: Sleep extractor for the daily sleep endpoint, keyed by the user's display name
// ABOUTME: Computes average sleep duration, stage, score, and sleeping heart rate over a range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use garmer_core::constants::endpoints;
use garmer_core::constants::units::SECONDS_PER_HOUR;
use garmer_core::conversions::mean;
use garmer_core::errors::AppResult;
use garmer_core::models::SleepData;
use garmer_core::normalize::format_calendar_date;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use super::{window_start, DateExtractor};
use crate::auth::SessionManager;

/// Sleep averages over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepStats {
    /// Nights with sleep data
    pub days_with_data: usize,
    /// Average total sleep in hours
    pub avg_sleep_hours: f64,
    /// Average deep sleep in hours
    pub avg_deep_sleep_hours: f64,
    /// Average REM sleep in hours
    pub avg_rem_sleep_hours: f64,
    /// Average overall score, over nights with a score
    pub avg_sleep_score: Option<f64>,
    /// Average sleeping heart rate, over nights with one
    pub avg_resting_hr: Option<f64>,
}

impl SleepStats {
    /// Aggregate nights of sleep
    #[must_use]
    pub fn from_nights(nights: &[SleepData]) -> Self {
        if nights.is_empty() {
            return Self::default();
        }

        let days = nights.len() as f64;
        let average_hours = |seconds: fn(&SleepData) -> u64| {
            nights.iter().map(|night| seconds(night) as f64).sum::<f64>() / days / SECONDS_PER_HOUR
        };

        Self {
            days_with_data: nights.len(),
            avg_sleep_hours: average_hours(|night| night.total_sleep_seconds),
            avg_deep_sleep_hours: average_hours(|night| night.deep_sleep_seconds),
            avg_rem_sleep_hours: average_hours(|night| night.rem_sleep_seconds),
            avg_sleep_score: mean(
                nights
                    .iter()
                    .filter_map(|night| night.overall_score)
                    .filter(|score| *score > 0)
                    .map(f64::from),
            ),
            avg_resting_hr: mean(
                nights
                    .iter()
                    .filter_map(|night| night.avg_sleep_heart_rate)
                    .filter(|hr| *hr > 0)
                    .map(f64::from),
            ),
        }
    }
}

/// Nightly sleep
///
/// Sleep for a date is the sleep that ended on that date.
#[derive(Clone)]
pub struct SleepExtractor {
    session: Arc<SessionManager>,
}

impl SleepExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Averages over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_sleep_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<SleepStats> {
        let nights = self.get_for_date_range(start, end).await?;
        Ok(SleepStats::from_nights(&nights))
    }

    /// Averages over the 7 days ending on `end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weekly_sleep_summary(&self, end: NaiveDate) -> AppResult<SleepStats> {
        self.get_sleep_stats(window_start(end, 7), end).await
    }
}

#[async_trait]
impl DateExtractor for SleepExtractor {
    type Item = SleepData;

    fn domain(&self) -> &'static str {
        "sleep"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<SleepData>> {
        let display_name = self.session.display_name().await?;
        let raw = self
            .session
            .get(
                &format!("{}/{}", endpoints::DAILY_SLEEP, encode(&display_name)),
                &[
                    ("nonSleepBufferMinutes", "60".to_owned()),
                    ("date", format_calendar_date(date)),
                ],
            )
            .await?;
        if raw.is_null() {
            return Ok(None);
        }
        let sleep = SleepData::from_raw(&raw)?;
        Ok(sleep.has_data().then_some(sleep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_empty_range() {
        let stats = SleepStats::from_nights(&[]);
        assert_eq!(stats.days_with_data, 0);
        assert!(stats.avg_sleep_hours.abs() < f64::EPSILON);
        assert!(stats.avg_sleep_score.is_none());
        assert!(stats.avg_resting_hr.is_none());
    }

    #[test]
    fn test_stats_ignore_missing_scores() {
        let nights = [
            SleepData::from_raw(&json!({
                "sleepTimeSeconds": 28800, "deepSleepSeconds": 7200, "remSleepSeconds": 3600,
                "sleepScores": {"overall": {"value": 80}}, "averageSleepHeartRate": 52
            }))
            .unwrap(),
            SleepData::from_raw(&json!({
                "sleepTimeSeconds": 21600, "deepSleepSeconds": 3600, "remSleepSeconds": 3600
            }))
            .unwrap(),
        ];
        let stats = SleepStats::from_nights(&nights);
        assert_eq!(stats.days_with_data, 2);
        assert!((stats.avg_sleep_hours - 7.0).abs() < 1e-9);
        assert!((stats.avg_deep_sleep_hours - 1.5).abs() < 1e-9);
        assert!((stats.avg_rem_sleep_hours - 1.0).abs() < 1e-9);
        assert_eq!(stats.avg_sleep_score, Some(80.0));
        assert_eq!(stats.avg_resting_hr, Some(52.0));
    }
}
