// ABOUTME: Date defaults for CLI commands
// ABOUTME: Single-day commands default to yesterday; exports default to a trailing window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use chrono::NaiveDate;
use garmer::extractors::{local_today, window_start};

/// `date`, or yesterday when absent
///
/// Yesterday is the most recent day whose data is complete.
pub fn or_yesterday(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| {
        let today = local_today();
        today.pred_opt().unwrap_or(today)
    })
}

/// Export window: explicit bounds, else `days` days ending on `end` (default today)
pub fn export_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    days: u32,
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or_else(local_today);
    let start = start.unwrap_or_else(|| window_start(end, days.max(1)));
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_range_defaults_to_trailing_window() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
        let (start, actual_end) = export_range(None, Some(end), 7);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(actual_end, end);
    }

    #[test]
    fn test_explicit_date_wins() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(or_yesterday(Some(date)), date);
    }
}
