// ABOUTME: Heart rate extractor for the daily heart rate endpoint
// ABOUTME: Provides resting heart rate, intraday timeseries, trends, and range statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use garmer_core::constants::endpoints;
use garmer_core::conversions::mean;
use garmer_core::errors::AppResult;
use garmer_core::models::HeartRateData;
use garmer_core::normalize::format_calendar_date;
use serde::{Deserialize, Serialize};

use super::DateExtractor;
use crate::auth::SessionManager;

/// Default length of the resting heart rate trend
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Heart rate statistics over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateStats {
    /// Days with heart rate data
    pub days_with_data: usize,
    /// Average resting heart rate
    pub avg_resting_hr: Option<f64>,
    /// Lowest resting heart rate
    pub min_resting_hr: Option<u32>,
    /// Highest resting heart rate
    pub max_resting_hr: Option<u32>,
    /// Average daily maximum
    pub avg_max_hr: Option<f64>,
}

impl HeartRateStats {
    /// Aggregate days of heart rate data, ignoring missing or zero readings
    #[must_use]
    pub fn from_days(days: &[HeartRateData]) -> Self {
        let resting: Vec<u32> = days
            .iter()
            .filter_map(|day| day.resting_heart_rate)
            .filter(|hr| *hr > 0)
            .collect();

        Self {
            days_with_data: days.len(),
            avg_resting_hr: mean(resting.iter().copied().map(f64::from)),
            min_resting_hr: resting.iter().copied().min(),
            max_resting_hr: resting.iter().copied().max(),
            avg_max_hr: mean(
                days.iter()
                    .filter_map(|day| day.max_heart_rate)
                    .filter(|hr| *hr > 0)
                    .map(f64::from),
            ),
        }
    }
}

/// Daily heart rate
#[derive(Clone)]
pub struct HeartRateExtractor {
    session: Arc<SessionManager>,
}

impl HeartRateExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Resting heart rate on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_resting_heart_rate(&self, date: NaiveDate) -> AppResult<Option<u32>> {
        Ok(self
            .get_for_date(date)
            .await?
            .and_then(|data| data.resting_heart_rate))
    }

    /// Timestamped positive readings on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_heart_rate_timeseries(
        &self,
        date: NaiveDate,
    ) -> AppResult<Vec<(DateTime<Utc>, u32)>> {
        let Some(data) = self.get_for_date(date).await? else {
            return Ok(Vec::new());
        };
        Ok(data
            .heart_rate_samples
            .iter()
            .filter(|sample| sample.heart_rate > 0)
            .filter_map(|sample| sample.timestamp.map(|ts| (ts, sample.heart_rate)))
            .collect())
    }

    /// Resting heart rate per day over the `days` days ending on `end`
    ///
    /// Days whose response carries no calendar date are skipped.
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_resting_hr_trend(
        &self,
        end: NaiveDate,
        days: u32,
    ) -> AppResult<Vec<(NaiveDate, Option<u32>)>> {
        Ok(self
            .get_last_n_days(end, days)
            .await?
            .into_iter()
            .filter_map(|data| data.calendar_date.map(|date| (date, data.resting_heart_rate)))
            .collect())
    }

    /// Statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_heart_rate_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<HeartRateStats> {
        let days = self.get_for_date_range(start, end).await?;
        Ok(HeartRateStats::from_days(&days))
    }
}

#[async_trait]
impl DateExtractor for HeartRateExtractor {
    type Item = HeartRateData;

    fn domain(&self) -> &'static str {
        "heart_rate"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<HeartRateData>> {
        let raw = self
            .session
            .get(
                endpoints::DAILY_HEART_RATE,
                &[("date", format_calendar_date(date))],
            )
            .await?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(HeartRateData::from_raw(&raw)?))
    }
}
