// ABOUTME: Daily summary extractor for the user summary endpoint
// ABOUTME: Aggregates calendar-week and calendar-month totals from per-day summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate};
use garmer_core::constants::endpoints;
use garmer_core::constants::units::METERS_PER_KM;
use garmer_core::conversions::mean;
use garmer_core::errors::{AppError, AppResult};
use garmer_core::models::DailySummary;
use garmer_core::normalize::format_calendar_date;
use serde::{Deserialize, Serialize};

use super::DateExtractor;
use crate::auth::SessionManager;

/// Totals shared by the weekly and monthly summaries
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DailyTotals {
    days_with_data: usize,
    total_steps: u64,
    avg_steps: f64,
    total_calories: u64,
    total_active_calories: u64,
    total_distance_km: f64,
    avg_resting_hr: Option<f64>,
    avg_stress: Option<f64>,
    total_floors: f64,
    total_intensity_minutes: u32,
}

impl DailyTotals {
    fn from_days(days: &[DailySummary]) -> Self {
        if days.is_empty() {
            return Self::default();
        }
        let total_steps = days.iter().map(|day| day.total_steps).fold(0, u64::saturating_add);

        Self {
            days_with_data: days.len(),
            total_steps,
            avg_steps: total_steps as f64 / days.len() as f64,
            total_calories: days
                .iter()
                .map(|day| day.total_kilocalories)
                .fold(0, u64::saturating_add),
            total_active_calories: days
                .iter()
                .map(|day| day.active_kilocalories)
                .fold(0, u64::saturating_add),
            total_distance_km: days.iter().map(|day| day.total_distance_meters).sum::<f64>()
                / METERS_PER_KM,
            avg_resting_hr: mean(
                days.iter()
                    .filter_map(|day| day.resting_heart_rate)
                    .map(f64::from),
            ),
            avg_stress: mean(
                days.iter()
                    .filter_map(|day| day.avg_stress_level)
                    .map(f64::from),
            ),
            total_floors: days.iter().map(|day| day.floors_ascended).sum(),
            total_intensity_minutes: days
                .iter()
                .map(DailySummary::total_intensity_minutes)
                .fold(0, u32::saturating_add),
        }
    }
}

/// Totals for one Monday-to-Sunday week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeeklySummary {
    /// Monday of the week
    pub week_start: NaiveDate,
    /// Sunday of the week
    pub week_end: NaiveDate,
    /// Days with a summary
    pub days_with_data: usize,
    /// Summed steps
    pub total_steps: u64,
    /// Average steps per day with data
    pub avg_steps: f64,
    /// Summed total kilocalories
    pub total_calories: u64,
    /// Summed active kilocalories
    pub total_active_calories: u64,
    /// Summed distance in kilometers
    pub total_distance_km: f64,
    /// Average resting heart rate over days reporting one
    pub avg_resting_hr: Option<f64>,
    /// Average stress level over days reporting one
    pub avg_stress: Option<f64>,
    /// Summed floors climbed
    pub total_floors: f64,
    /// Summed intensity minutes, vigorous counted double
    pub total_intensity_minutes: u32,
}

impl DailyWeeklySummary {
    /// Summarize the days of the week starting `week_start`
    #[must_use]
    pub fn from_days(week_start: NaiveDate, days: &[DailySummary]) -> Self {
        let totals = DailyTotals::from_days(days);
        Self {
            week_start,
            week_end: week_start.checked_add_days(Days::new(6)).unwrap_or(week_start),
            days_with_data: totals.days_with_data,
            total_steps: totals.total_steps,
            avg_steps: totals.avg_steps,
            total_calories: totals.total_calories,
            total_active_calories: totals.total_active_calories,
            total_distance_km: totals.total_distance_km,
            avg_resting_hr: totals.avg_resting_hr,
            avg_stress: totals.avg_stress,
            total_floors: totals.total_floors,
            total_intensity_minutes: totals.total_intensity_minutes,
        }
    }
}

/// Totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Year
    pub year: i32,
    /// Month, 1 through 12
    pub month: u32,
    /// Days with a summary
    pub days_with_data: usize,
    /// Summed steps
    pub total_steps: u64,
    /// Average steps per day with data
    pub avg_steps: f64,
    /// Summed total kilocalories
    pub total_calories: u64,
    /// Summed distance in kilometers
    pub total_distance_km: f64,
    /// Average resting heart rate over days reporting one
    pub avg_resting_hr: Option<f64>,
    /// Average stress level over days reporting one
    pub avg_stress: Option<f64>,
}

impl MonthlySummary {
    /// Summarize the days of `year`-`month`
    #[must_use]
    pub fn from_days(year: i32, month: u32, days: &[DailySummary]) -> Self {
        let totals = DailyTotals::from_days(days);
        Self {
            year,
            month,
            days_with_data: totals.days_with_data,
            total_steps: totals.total_steps,
            avg_steps: totals.avg_steps,
            total_calories: totals.total_calories,
            total_distance_km: totals.total_distance_km,
            avg_resting_hr: totals.avg_resting_hr,
            avg_stress: totals.avg_stress,
        }
    }
}

/// First and last day of a calendar month
///
/// # Errors
///
/// Returns `InvalidInput` for a month outside 1 through 12 or an
/// unrepresentable year
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::invalid_input(format!("Invalid month {year}-{month:02}"));
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let end = next.pred_opt().ok_or_else(invalid)?;
    Ok((start, end))
}

/// Daily summaries
#[derive(Clone)]
pub struct DailyExtractor {
    session: Arc<SessionManager>,
}

impl DailyExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Totals for the Monday-to-Sunday week starting `week_start`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weekly_summary(&self, week_start: NaiveDate) -> AppResult<DailyWeeklySummary> {
        let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(week_start);
        let days = self.get_for_date_range(week_start, week_end).await?;
        Ok(DailyWeeklySummary::from_days(week_start, &days))
    }

    /// Totals for a calendar month
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an invalid month, otherwise
    /// authentication-class errors only
    pub async fn get_monthly_summary(&self, year: i32, month: u32) -> AppResult<MonthlySummary> {
        let (start, end) = month_bounds(year, month)?;
        let days = self.get_for_date_range(start, end).await?;
        Ok(MonthlySummary::from_days(year, month, &days))
    }

    /// Totals for the month containing `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_monthly_summary_for(&self, date: NaiveDate) -> AppResult<MonthlySummary> {
        self.get_monthly_summary(date.year(), date.month()).await
    }
}

#[async_trait]
impl DateExtractor for DailyExtractor {
    type Item = DailySummary;

    fn domain(&self) -> &'static str {
        "daily_summary"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<DailySummary>> {
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
        Ok(Some(DailySummary::from_raw(&raw)?))
    }
}
