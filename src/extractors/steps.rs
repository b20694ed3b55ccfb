// ABOUTME: Step extractor reading the step breakdown from the user summary endpoint
// ABOUTME: Provides step statistics, intraday timeseries, floors, and intensity minutes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use garmer_core::constants::endpoints;
use garmer_core::errors::AppResult;
use garmer_core::models::{StepsData, StepsSample};
use garmer_core::normalize::format_calendar_date;
use serde::{Deserialize, Serialize};

use super::{window_start, DateExtractor};
use crate::auth::SessionManager;

/// Step statistics over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsStats {
    /// Days with step data
    pub days_with_data: usize,
    /// Summed steps
    pub total_steps: u64,
    /// Average steps per day with data
    pub avg_daily_steps: f64,
    /// Highest single-day count
    pub max_steps_day: u64,
    /// Lowest single-day count
    pub min_steps_day: u64,
    /// Days on which the goal was reached
    pub days_goal_reached: usize,
    /// Share of days with data on which the goal was reached
    pub goal_reached_percentage: f64,
}

impl StepsStats {
    /// Aggregate days of step data
    #[must_use]
    pub fn from_days(days: &[StepsData]) -> Self {
        if days.is_empty() {
            return Self::default();
        }

        let count = days.len() as f64;
        let total_steps = days.iter().map(|day| day.total_steps).fold(0, u64::saturating_add);
        let days_goal_reached = days.iter().filter(|day| day.goal_reached()).count();

        Self {
            days_with_data: days.len(),
            total_steps,
            avg_daily_steps: total_steps as f64 / count,
            max_steps_day: days.iter().map(|day| day.total_steps).max().unwrap_or(0),
            min_steps_day: days.iter().map(|day| day.total_steps).min().unwrap_or(0),
            days_goal_reached,
            goal_reached_percentage: days_goal_reached as f64 / count * 100.0,
        }
    }
}

/// Daily steps, floors, and intensity minutes
#[derive(Clone)]
pub struct StepsExtractor {
    session: Arc<SessionManager>,
}

impl StepsExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Total steps on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_total_steps(&self, date: NaiveDate) -> AppResult<Option<u64>> {
        Ok(self.get_for_date(date).await?.map(|steps| steps.total_steps))
    }

    /// Intraday step samples on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_steps_timeseries(&self, date: NaiveDate) -> AppResult<Vec<StepsSample>> {
        Ok(self
            .get_for_date(date)
            .await?
            .map(|steps| steps.steps_samples)
            .unwrap_or_default())
    }

    /// Statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_steps_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<StepsStats> {
        let days = self.get_for_date_range(start, end).await?;
        Ok(StepsStats::from_days(&days))
    }

    /// Statistics over the 7 days ending on `end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weekly_steps_summary(&self, end: NaiveDate) -> AppResult<StepsStats> {
        self.get_steps_stats(window_start(end, 7), end).await
    }

    /// Floors ascended and descended on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_floors_for_date(&self, date: NaiveDate) -> AppResult<Option<(f64, f64)>> {
        Ok(self
            .get_for_date(date)
            .await?
            .map(|steps| (steps.floors_ascended, steps.floors_descended)))
    }

    /// Moderate and vigorous intensity minutes on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_intensity_minutes(&self, date: NaiveDate) -> AppResult<Option<(u32, u32)>> {
        Ok(self.get_for_date(date).await?.map(|steps| {
            (
                steps.moderate_intensity_minutes,
                steps.vigorous_intensity_minutes,
            )
        }))
    }
}

#[async_trait]
impl DateExtractor for StepsExtractor {
    type Item = StepsData;

    fn domain(&self) -> &'static str {
        "steps"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<StepsData>> {
        let raw = self
            .session
            .get(
                endpoints::DAILY_SUMMARY,
                &[("calendarDate", format_calendar_date(date))],
            )
            .await?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(StepsData::from_raw(&raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_stats() {
        let days: Vec<StepsData> = [12000, 6000, 9000]
            .iter()
            .map(|steps| {
                StepsData::from_raw(&json!({"totalSteps": steps, "dailyStepGoal": 8000})).unwrap()
            })
            .collect();
        let stats = StepsStats::from_days(&days);

        assert_eq!(stats.days_with_data, 3);
        assert_eq!(stats.total_steps, 27000);
        assert!((stats.avg_daily_steps - 9000.0).abs() < 1e-9);
        assert_eq!(stats.max_steps_day, 12000);
        assert_eq!(stats.min_steps_day, 6000);
        assert_eq!(stats.days_goal_reached, 2);
        assert!((stats.goal_reached_percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_steps_stats_empty() {
        let stats = StepsStats::from_days(&[]);
        assert_eq!(stats.days_with_data, 0);
        assert_eq!(stats.max_steps_day, 0);
        assert!(stats.goal_reached_percentage.abs() < f64::EPSILON);
    }
}
