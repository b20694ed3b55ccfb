// ABOUTME: Per-domain extractors mapping Garmin Connect endpoints to typed entities
// ABOUTME: DateExtractor provides failure containment and sequential date-range iteration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! # Extractors
//!
//! One extractor per data domain. Single-date fetches go through
//! [`DateExtractor::get_for_date`], which contains every failure except
//! authentication errors: a malformed or unavailable day becomes `None`, a
//! dead session propagates.

mod activities;
mod body;
mod daily;
mod heart_rate;
mod hydration;
mod respiration;
mod sleep;
mod steps;
mod stress;
mod user;

pub use activities::{ActivityExtractor, ActivityQuery, ActivityWeeklySummary};
pub use body::{BodyExtractor, WeightStats};
pub use daily::{DailyExtractor, DailyWeeklySummary, MonthlySummary};
pub use heart_rate::{HeartRateExtractor, HeartRateStats};
pub use hydration::HydrationExtractor;
pub use respiration::RespirationExtractor;
pub use sleep::{SleepExtractor, SleepStats};
pub use steps::{StepsExtractor, StepsStats};
pub use stress::{StressExtractor, StressStats};
pub use user::{FullProfile, UserExtractor};

use async_trait::async_trait;
use chrono::{Datelike, Days, Local, NaiveDate};
use garmer_core::errors::AppResult;
use garmer_core::normalize::{json_type_name, ParseError};
use serde_json::Value;
use tracing::{debug, warn};

/// Today's date in the local calendar
///
/// The only place that reads the wall clock for a default date.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday of the calendar week containing `date`
#[must_use]
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// First day of the `n`-day window ending on `end`
#[must_use]
pub fn window_start(end: NaiveDate, days: u32) -> NaiveDate {
    let back = u64::from(days.saturating_sub(1));
    end.checked_sub_days(Days::new(back)).unwrap_or(end)
}

/// Every date from `start` to `end` inclusive, empty when `start > end`
pub fn dates_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// Keep authentication errors, log and drop everything else
///
/// # Errors
///
/// Returns `result` unchanged when it holds an authentication-class error
pub fn contain<T>(
    domain: &str,
    date: NaiveDate,
    result: AppResult<Option<T>>,
) -> AppResult<Option<T>> {
    match result {
        Ok(Some(item)) => Ok(Some(item)),
        Ok(None) => {
            debug!(domain, date = %date, "No data");
            Ok(None)
        }
        Err(e) if e.is_authentication() => Err(e),
        Err(e) => {
            warn!(domain, date = %date, error = %e, "Failed to get data");
            Ok(None)
        }
    }
}

/// Keep authentication errors, log anything else and fall back to the default
///
/// For requests not keyed by a single date.
///
/// # Errors
///
/// Returns `result` unchanged when it holds an authentication-class error
pub fn contain_default<T: Default>(what: &str, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_authentication() => Err(e),
        Err(e) => {
            warn!(what, error = %e, "Request failed");
            Ok(T::default())
        }
    }
}

/// First element of a list response, `None` for `null` or an empty list
fn first_element<'a>(
    raw: &'a Value,
    entity: &'static str,
) -> Result<Option<&'a Value>, ParseError> {
    match raw {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(items.first()),
        other => Err(ParseError::NotAnArray {
            entity,
            found: json_type_name(other),
        }),
    }
}

/// Single-date fetch with containment and sequential range iteration
#[async_trait]
pub trait DateExtractor: Send + Sync {
    /// Entity produced for one date
    type Item: Send + 'static;

    /// Domain name used in logs
    fn domain(&self) -> &'static str;

    /// Fetch and parse one date, propagating every error
    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<Self::Item>>;

    /// Fetch one date; failures other than authentication become `None`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    async fn get_for_date(&self, date: NaiveDate) -> AppResult<Option<Self::Item>> {
        contain(self.domain(), date, self.fetch_for_date(date).await)
    }

    /// Fetch every date from `start` to `end` inclusive, in order, skipping
    /// dates without data
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    async fn get_for_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Self::Item>> {
        let mut items = Vec::new();
        for date in dates_inclusive(start, end) {
            if let Some(item) = self.get_for_date(date).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Fetch the `days`-day window ending on `end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    async fn get_last_n_days(&self, end: NaiveDate, days: u32) -> AppResult<Vec<Self::Item>> {
        if days == 0 {
            return Ok(Vec::new());
        }
        self.get_for_date_range(window_start(end, days), end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-17 is a Wednesday
        assert_eq!(week_start_for(date("2024-01-17")), date("2024-01-15"));
        assert_eq!(week_start_for(date("2024-01-15")), date("2024-01-15"));
        assert_eq!(week_start_for(date("2024-01-21")), date("2024-01-15"));
    }

    #[test]
    fn test_dates_inclusive() {
        let dates: Vec<_> = dates_inclusive(date("2024-02-27"), date("2024-03-01")).collect();
        assert_eq!(
            dates,
            vec![
                date("2024-02-27"),
                date("2024-02-28"),
                date("2024-02-29"),
                date("2024-03-01")
            ]
        );
        assert_eq!(dates_inclusive(date("2024-03-02"), date("2024-03-01")).count(), 0);
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(date("2024-01-21"), 7), date("2024-01-15"));
        assert_eq!(window_start(date("2024-01-21"), 1), date("2024-01-21"));
    }
}
