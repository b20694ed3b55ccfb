// ABOUTME: Activity extractor for the activity search, detail, lap, and heart rate zone endpoints
// ABOUTME: Supports type filtering, offset pagination, and weekly activity summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use garmer_core::constants::endpoints;
use garmer_core::constants::units::{METERS_PER_KM, SECONDS_PER_HOUR};
use garmer_core::errors::AppResult;
use garmer_core::models::{Activity, HeartRateZone, Lap};
use garmer_core::normalize::{format_calendar_date, json_type_name, ParseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::DateExtractor;
use crate::auth::SessionManager;

/// Default number of activities per query
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page requested from the search endpoint
const PAGE_SIZE: u32 = 100;

/// Filters and pagination for activity searches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Only activities on or after this date
    pub start_date: Option<NaiveDate>,
    /// Only activities on or before this date
    pub end_date: Option<NaiveDate>,
    /// Activity type key such as `running`
    pub activity_type: Option<String>,
    /// Maximum number of activities returned
    pub limit: u32,
    /// Activities to skip
    pub offset: u32,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            activity_type: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ActivityQuery {
    /// Activities between two dates inclusive
    #[must_use]
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }

    /// Restrict to one activity type
    #[must_use]
    pub fn of_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }

    /// Set the maximum number of results
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Skip the first `offset` results
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    fn page_params(&self, start: u32, limit: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("start", start.to_string()), ("limit", limit.to_string())];
        if let Some(date) = self.start_date {
            params.push(("startDate", format_calendar_date(date)));
        }
        if let Some(date) = self.end_date {
            params.push(("endDate", format_calendar_date(date)));
        }
        if let Some(activity_type) = &self.activity_type {
            params.push(("activityType", activity_type.clone()));
        }
        params
    }
}

/// Activity totals for one calendar week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWeeklySummary {
    /// Monday of the week
    pub week_start: NaiveDate,
    /// Sunday of the week
    pub week_end: NaiveDate,
    /// Number of activities
    pub activity_count: usize,
    /// Summed distance in kilometers
    pub total_distance_km: f64,
    /// Summed duration in hours
    pub total_duration_hours: f64,
    /// Summed calories
    pub total_calories: f64,
    /// Activity count per type key
    pub activities_by_type: BTreeMap<String, usize>,
}

impl ActivityWeeklySummary {
    /// Summarize `activities` for the week starting `week_start`
    #[must_use]
    pub fn from_activities(week_start: NaiveDate, activities: &[Activity]) -> Self {
        let mut activities_by_type = BTreeMap::new();
        for activity in activities {
            *activities_by_type
                .entry(activity.activity_type_key.clone())
                .or_insert(0) += 1;
        }

        Self {
            week_start,
            week_end: week_start.checked_add_days(Days::new(6)).unwrap_or(week_start),
            activity_count: activities.len(),
            total_distance_km: activities.iter().map(|a| a.distance_meters).sum::<f64>()
                / METERS_PER_KM,
            total_duration_hours: activities.iter().map(|a| a.duration_seconds).sum::<f64>()
                / SECONDS_PER_HOUR,
            total_calories: activities.iter().map(|a| a.calories).sum(),
            activities_by_type,
        }
    }
}

/// Parse a search response, skipping elements that are not activities
///
/// Returns the number of raw elements alongside the parsed activities.
fn parse_activity_list(raw: &Value) -> AppResult<(usize, Vec<Activity>)> {
    let items = match raw {
        Value::Null => return Ok((0, Vec::new())),
        Value::Array(items) => items,
        other => {
            return Err(ParseError::NotAnArray {
                entity: "Activity",
                found: json_type_name(other),
            }
            .into())
        }
    };

    let activities = items
        .iter()
        .filter_map(|item| {
            Activity::from_raw(item)
                .inspect_err(|e| warn!(error = %e, "Skipping unreadable activity"))
                .ok()
        })
        .collect();
    Ok((items.len(), activities))
}

/// Activities, laps, and heart rate zones
#[derive(Clone)]
pub struct ActivityExtractor {
    session: Arc<SessionManager>,
}

impl ActivityExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Search activities, fetching pages of up to 100 until `query.limit` is
    /// reached or the server runs out
    ///
    /// # Errors
    ///
    /// Returns an error if a page cannot be fetched or is not a list
    pub async fn get_activities(&self, query: &ActivityQuery) -> AppResult<Vec<Activity>> {
        let limit = query.limit as usize;
        let mut activities = Vec::new();
        let mut start = query.offset;

        while activities.len() < limit {
            let remaining = u32::try_from(limit - activities.len()).unwrap_or(u32::MAX);
            let page_size = remaining.min(PAGE_SIZE);
            let raw = self
                .session
                .get(endpoints::ACTIVITY_SEARCH, &query.page_params(start, page_size))
                .await?;
            let (fetched, page) = parse_activity_list(&raw)?;
            activities.extend(page);

            if fetched < page_size as usize {
                break;
            }
            start = start.saturating_add(page_size);
        }

        activities.truncate(limit);
        debug!(count = activities.len(), "Fetched activities");
        Ok(activities)
    }

    /// All activities on `date`, in server order
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_activities_for_date(&self, date: NaiveDate) -> AppResult<Vec<Activity>> {
        self.get_activities(&ActivityQuery::between(date, date).limit(PAGE_SIZE))
            .await
    }

    /// Most recent activities
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_recent_activities(&self, limit: u32) -> AppResult<Vec<Activity>> {
        self.get_activities(&ActivityQuery::default().limit(limit))
            .await
    }

    /// Activities of one type, optionally within a date window
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_activities_by_type(
        &self,
        activity_type: &str,
        limit: u32,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<Activity>> {
        let query = ActivityQuery {
            start_date,
            end_date,
            ..ActivityQuery::default()
        }
        .of_type(activity_type)
        .limit(limit);
        self.get_activities(&query).await
    }

    /// One activity by id
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a parse error
    pub async fn get_activity_by_id(&self, activity_id: u64) -> AppResult<Activity> {
        let raw = self
            .session
            .get(&format!("{}/{activity_id}", endpoints::ACTIVITY), &[])
            .await?;
        Ok(Activity::from_raw(&raw)?)
    }

    /// Full detail payload of an activity (charts, polyline), unparsed
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_activity_details(&self, activity_id: u64) -> AppResult<Value> {
        self.session
            .get(&format!("{}/{activity_id}/details", endpoints::ACTIVITY), &[])
            .await
    }

    /// Laps of an activity
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_activity_laps(&self, activity_id: u64) -> AppResult<Vec<Lap>> {
        let raw = self
            .session
            .get(&format!("{}/{activity_id}/splits", endpoints::ACTIVITY), &[])
            .await?;
        Ok(raw
            .get("lapDTOs")
            .and_then(Value::as_array)
            .map(|laps| laps.iter().filter_map(|lap| Lap::from_raw(lap).ok()).collect())
            .unwrap_or_default())
    }

    /// Time spent in each heart rate zone during an activity
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_activity_hr_zones(&self, activity_id: u64) -> AppResult<Vec<HeartRateZone>> {
        let raw = self
            .session
            .get(
                &format!("{}/{activity_id}/hrTimeInZones", endpoints::ACTIVITY),
                &[],
            )
            .await?;
        Ok(raw
            .as_array()
            .map(|zones| {
                zones
                    .iter()
                    .filter_map(|zone| HeartRateZone::from_raw(zone).ok())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Totals for the week starting `week_start` (Monday through Sunday)
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_weekly_summary(&self, week_start: NaiveDate) -> AppResult<ActivityWeeklySummary> {
        let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(week_start);
        let activities = self
            .get_activities(&ActivityQuery::between(week_start, week_end).limit(PAGE_SIZE))
            .await?;
        Ok(ActivityWeeklySummary::from_activities(week_start, &activities))
    }
}

#[async_trait]
impl DateExtractor for ActivityExtractor {
    type Item = Activity;

    fn domain(&self) -> &'static str {
        "activities"
    }

    /// First activity the server lists for the date
    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<Activity>> {
        Ok(self.get_activities_for_date(date).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weekly_summary_groups_by_type() {
        let raw = json!([
            {"activityId": 1, "activityType": {"typeKey": "running"}, "distance": 5000.0, "duration": 1800.0, "calories": 300.0},
            {"activityId": 2, "activityType": {"typeKey": "running"}, "distance": 10000.0, "duration": 3600.0, "calories": 600.0},
            {"activityId": 3, "activityType": {"typeKey": "cycling"}, "distance": 20000.0, "duration": 3600.0, "calories": 500.0}
        ]);
        let (_, activities) = parse_activity_list(&raw).unwrap();
        let week_start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let summary = ActivityWeeklySummary::from_activities(week_start, &activities);

        assert_eq!(summary.activity_count, 3);
        assert_eq!(summary.week_end, NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
        assert!((summary.total_distance_km - 35.0).abs() < 1e-9);
        assert!((summary.total_duration_hours - 2.5).abs() < 1e-9);
        assert!((summary.total_calories - 1400.0).abs() < 1e-9);
        assert_eq!(summary.activities_by_type.get("running"), Some(&2));
        assert_eq!(summary.activities_by_type.get("cycling"), Some(&1));
    }

    #[test]
    fn test_activity_list_skips_entries_without_id() {
        let raw = json!([{"activityId": 1}, {"activityName": "no id"}, "junk"]);
        let (fetched, activities) = parse_activity_list(&raw).unwrap();
        assert_eq!(fetched, 3);
        assert_eq!(activities.len(), 1);
    }

    #[test]
    fn test_query_params() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let params = ActivityQuery::between(date, date)
            .of_type("running")
            .page_params(40, 20);
        assert!(params.contains(&("start", "40".to_owned())));
        assert!(params.contains(&("limit", "20".to_owned())));
        assert!(params.contains(&("startDate", "2024-01-15".to_owned())));
        assert!(params.contains(&("activityType", "running".to_owned())));
    }
}
