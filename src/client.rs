// ABOUTME: GarminClient facade combining the session manager and every domain extractor
// ABOUTME: Builds health snapshots, weekly reports, and exports that tolerate per-domain failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! # Garmin Client
//!
//! [`GarminClient`] is the entry point for library users. It owns one
//! [`SessionManager`] shared by all extractors and forwards each extractor
//! operation with an explicit date. The composite calls
//! ([`GarminClient::get_health_snapshot`],
//! [`GarminClient::weekly_health_report_ending`],
//! [`GarminClient::export_data`]) never fail because one domain is
//! unavailable: only authentication errors abort them.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use garmer_core::constants::units::{METERS_PER_KM, SECONDS_PER_HOUR};
use garmer_core::errors::{AppError, AppResult};
use garmer_core::models::{
    Activity, BodyBatteryReport, BodyComposition, DailySummary, Device, HeartRateData,
    HeartRateZone, HydrationData, Lap, RespirationData, SleepData, StepsData, StepsSample,
    StressData, UserProfile, UserSettings, Weight,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::{create_auth, SessionManager};
use crate::config::GarmerConfig;
use crate::extractors::{
    contain_default, local_today, window_start, ActivityExtractor, ActivityQuery,
    ActivityWeeklySummary, BodyExtractor, DailyExtractor, DailyWeeklySummary, DateExtractor,
    FullProfile, HeartRateExtractor, HeartRateStats, HydrationExtractor, MonthlySummary,
    RespirationExtractor, SleepExtractor, SleepStats, StepsExtractor, StepsStats,
    StressExtractor, StressStats, UserExtractor, WeightStats,
};

/// Error message when no saved session can be resumed
pub const NO_SAVED_TOKENS_MESSAGE: &str =
    "No saved tokens found. Please login with credentials first.";

/// Activities fetched for an export
pub const EXPORT_ACTIVITY_LIMIT: u32 = 1000;

/// Activities fetched for a weekly report
const REPORT_ACTIVITY_LIMIT: u32 = 100;

/// Days covered by the weekly report
const REPORT_DAYS: u32 = 7;

/// Heart rate section of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateSnapshot {
    /// Resting heart rate
    pub resting: Option<u32>,
    /// Highest reading
    pub max: Option<u32>,
    /// Lowest reading
    pub min: Option<u32>,
    /// Average reading
    pub avg: Option<u32>,
}

impl From<&HeartRateData> for HeartRateSnapshot {
    fn from(data: &HeartRateData) -> Self {
        Self {
            resting: data.resting_heart_rate,
            max: data.max_heart_rate,
            min: data.min_heart_rate,
            avg: data.avg_heart_rate,
        }
    }
}

/// Stress section of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressSnapshot {
    /// Average stress level
    pub avg_level: Option<i32>,
    /// Highest stress level
    pub max_level: Option<i32>,
    /// Time at rest in hours
    pub rest_hours: f64,
    /// Time at high stress in hours
    pub high_stress_hours: f64,
}

impl From<&StressData> for StressSnapshot {
    fn from(data: &StressData) -> Self {
        Self {
            avg_level: data.avg_stress_level,
            max_level: data.max_stress_level,
            rest_hours: data.rest_duration_hours(),
            high_stress_hours: data.high_stress_hours(),
        }
    }
}

/// Steps section of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsSnapshot {
    /// Total steps
    pub total: u64,
    /// Step goal
    pub goal: u32,
    /// Whether the goal was reached
    pub goal_reached: bool,
    /// Distance in kilometers
    pub distance_km: f64,
    /// Floors climbed
    pub floors_ascended: f64,
    /// Intensity minutes, vigorous counted double
    pub intensity_minutes: u32,
}

impl From<&StepsData> for StepsSnapshot {
    fn from(data: &StepsData) -> Self {
        Self {
            total: data.total_steps,
            goal: data.step_goal,
            goal_reached: data.goal_reached(),
            distance_km: data.total_distance_km(),
            floors_ascended: data.floors_ascended,
            intensity_minutes: data.total_intensity_minutes(),
        }
    }
}

/// Hydration section of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HydrationSnapshot {
    /// Logged intake in milliliters
    pub intake_ml: f64,
    /// Goal in milliliters
    pub goal_ml: f64,
    /// Intake as a percentage of the goal
    pub goal_percentage: f64,
}

impl From<&HydrationData> for HydrationSnapshot {
    fn from(data: &HydrationData) -> Self {
        Self {
            intake_ml: data.total_intake_ml,
            goal_ml: data.goal_ml,
            goal_percentage: data.goal_percentage(),
        }
    }
}

/// Respiration section of a snapshot, in breaths per minute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespirationSnapshot {
    /// Average while awake
    pub avg_waking: Option<f64>,
    /// Average while asleep
    pub avg_sleeping: Option<f64>,
    /// Highest value
    pub highest: Option<f64>,
    /// Lowest value
    pub lowest: Option<f64>,
}

impl From<&RespirationData> for RespirationSnapshot {
    fn from(data: &RespirationData) -> Self {
        Self {
            avg_waking: data.avg_waking_respiration,
            avg_sleeping: data.avg_sleeping_respiration,
            highest: data.highest_respiration,
            lowest: data.lowest_respiration,
        }
    }
}

/// Every domain for one date; unavailable domains are `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Snapshot date
    pub date: NaiveDate,
    /// Daily summary
    pub daily_summary: Option<DailySummary>,
    /// Sleep ending on the date
    pub sleep: Option<SleepData>,
    /// Heart rate summary
    pub heart_rate: Option<HeartRateSnapshot>,
    /// Stress summary
    pub stress: Option<StressSnapshot>,
    /// Steps summary
    pub steps: Option<StepsSnapshot>,
    /// Hydration summary
    pub hydration: Option<HydrationSnapshot>,
    /// Respiration summary
    pub respiration: Option<RespirationSnapshot>,
}

impl HealthSnapshot {
    /// Number of domains with data
    #[must_use]
    pub fn domains_with_data(&self) -> usize {
        [
            self.daily_summary.is_some(),
            self.sleep.is_some(),
            self.heart_rate.is_some(),
            self.stress.is_some(),
            self.steps.is_some(),
            self.hydration.is_some(),
            self.respiration.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Inclusive date range of a report or export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First date
    pub start: NaiveDate,
    /// Last date
    pub end: NaiveDate,
}

/// Activity section of the weekly report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Number of activities
    pub count: usize,
    /// Summed duration in hours
    pub total_duration_hours: f64,
    /// Summed distance in kilometers
    pub total_distance_km: f64,
    /// Summed calories
    pub total_calories: f64,
    /// Distinct activity type keys, sorted
    pub types: Vec<String>,
}

impl ActivityReport {
    /// Summarize activities, `None` when there are none
    #[must_use]
    pub fn from_activities(activities: &[Activity]) -> Option<Self> {
        if activities.is_empty() {
            return None;
        }
        let types: BTreeSet<&str> = activities
            .iter()
            .map(|activity| activity.activity_type_key.as_str())
            .collect();

        Some(Self {
            count: activities.len(),
            total_duration_hours: activities
                .iter()
                .map(|activity| activity.duration_seconds)
                .sum::<f64>()
                / SECONDS_PER_HOUR,
            total_distance_km: activities
                .iter()
                .map(|activity| activity.distance_meters)
                .sum::<f64>()
                / METERS_PER_KM,
            total_calories: activities.iter().map(|activity| activity.calories).sum(),
            types: types.into_iter().map(str::to_owned).collect(),
        })
    }
}

/// Sleep section of the weekly report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepReport {
    /// Nights with data
    pub days_with_data: usize,
    /// Average total sleep in hours
    pub avg_hours: f64,
    /// Average deep sleep in hours
    pub avg_deep_hours: f64,
    /// Average REM sleep in hours
    pub avg_rem_hours: f64,
    /// Average sleep score
    pub avg_score: Option<f64>,
}

impl From<&SleepStats> for SleepReport {
    fn from(stats: &SleepStats) -> Self {
        Self {
            days_with_data: stats.days_with_data,
            avg_hours: stats.avg_sleep_hours,
            avg_deep_hours: stats.avg_deep_sleep_hours,
            avg_rem_hours: stats.avg_rem_sleep_hours,
            avg_score: stats.avg_sleep_score,
        }
    }
}

/// Steps section of the weekly report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsReport {
    /// Summed steps
    pub total: u64,
    /// Average steps per day with data
    pub avg_daily: f64,
    /// Highest single-day count
    pub max_day: u64,
    /// Days on which the goal was reached
    pub days_goal_reached: usize,
}

impl From<&StepsStats> for StepsReport {
    fn from(stats: &StepsStats) -> Self {
        Self {
            total: stats.total_steps,
            avg_daily: stats.avg_daily_steps,
            max_day: stats.max_steps_day,
            days_goal_reached: stats.days_goal_reached,
        }
    }
}

/// Heart rate section of the weekly report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartRateReport {
    /// Average resting heart rate
    pub avg_resting: Option<f64>,
    /// Lowest resting heart rate
    pub min_resting: Option<u32>,
    /// Highest resting heart rate
    pub max_resting: Option<u32>,
}

impl From<&HeartRateStats> for HeartRateReport {
    fn from(stats: &HeartRateStats) -> Self {
        Self {
            avg_resting: stats.avg_resting_hr,
            min_resting: stats.min_resting_hr,
            max_resting: stats.max_resting_hr,
        }
    }
}

/// Stress section of the weekly report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    /// Average daily stress level
    pub avg_level: Option<f64>,
    /// Average rest time per day in hours
    pub avg_rest_hours: f64,
    /// Average high-stress time per day in hours
    pub avg_high_stress_hours: f64,
}

impl From<&StressStats> for StressReport {
    fn from(stats: &StressStats) -> Self {
        Self {
            avg_level: stats.avg_stress_level,
            avg_rest_hours: stats.avg_rest_hours,
            avg_high_stress_hours: stats.avg_high_stress_hours,
        }
    }
}

/// Seven-day health report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHealthReport {
    /// Covered dates
    pub period: ReportPeriod,
    /// Activity totals, `None` when no activities could be fetched
    pub activities: Option<ActivityReport>,
    /// Sleep averages
    pub sleep: SleepReport,
    /// Step totals
    pub steps: StepsReport,
    /// Resting heart rate range
    pub heart_rate: HeartRateReport,
    /// Stress averages
    pub stress: StressReport,
}

/// Domains included in an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Include activities
    pub activities: bool,
    /// Include sleep
    pub sleep: bool,
    /// Include daily summaries
    pub daily: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            activities: true,
            sleep: true,
            daily: true,
        }
    }
}

/// Exported data for a date range
///
/// Excluded domains are omitted from the serialized form; an included
/// domain that could not be fetched is an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    /// Covered dates
    pub period: ReportPeriod,
    /// Activities in the period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
    /// Sleep sessions in the period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<Vec<SleepData>>,
    /// Daily summaries in the period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_summaries: Option<Vec<DailySummary>>,
}

/// High-level Garmin Connect client
#[derive(Clone)]
pub struct GarminClient {
    session: Arc<SessionManager>,
    activities: ActivityExtractor,
    sleep: SleepExtractor,
    heart_rate: HeartRateExtractor,
    stress: StressExtractor,
    steps: StepsExtractor,
    daily: DailyExtractor,
    body: BodyExtractor,
    hydration: HydrationExtractor,
    respiration: RespirationExtractor,
    user: UserExtractor,
}

impl GarminClient {
    /// Client with a fresh, unauthenticated session
    #[must_use]
    pub fn new(config: GarmerConfig) -> Self {
        Self::with_session(Arc::new(SessionManager::new(config)))
    }

    /// Client sharing an existing session
    #[must_use]
    pub fn with_session(session: Arc<SessionManager>) -> Self {
        Self {
            activities: ActivityExtractor::new(Arc::clone(&session)),
            sleep: SleepExtractor::new(Arc::clone(&session)),
            heart_rate: HeartRateExtractor::new(Arc::clone(&session)),
            stress: StressExtractor::new(Arc::clone(&session)),
            steps: StepsExtractor::new(Arc::clone(&session)),
            daily: DailyExtractor::new(Arc::clone(&session)),
            body: BodyExtractor::new(Arc::clone(&session)),
            hydration: HydrationExtractor::new(Arc::clone(&session)),
            respiration: RespirationExtractor::new(Arc::clone(&session)),
            user: UserExtractor::new(Arc::clone(&session)),
            session,
        }
    }

    /// Log in with credentials and build a client
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the login is rejected
    pub async fn from_credentials(
        config: GarmerConfig,
        email: &str,
        password: &str,
        save_tokens: bool,
    ) -> AppResult<Self> {
        let client = Self::new(config);
        client.login(email, password, save_tokens).await?;
        Ok(client)
    }

    /// Resume the saved session
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no saved session can be resumed
    pub async fn from_saved_tokens(config: GarmerConfig) -> AppResult<Self> {
        let session = create_auth(config, None, false).await?;
        if !session.is_authenticated().await {
            return Err(AppError::auth_required(NO_SAVED_TOKENS_MESSAGE));
        }
        Ok(Self::with_session(Arc::new(session)))
    }

    /// Log in, optionally saving the session
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the login is rejected
    pub async fn login(&self, email: &str, password: &str, save_tokens: bool) -> AppResult<()> {
        self.session.login(email, password, save_tokens).await
    }

    /// Drop the session, optionally deleting the saved tokens
    pub async fn logout(&self, delete_tokens: bool) {
        self.session.logout(delete_tokens).await;
    }

    /// Whether a session is held
    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Shared session manager
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    // User

    /// Social profile
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request or parse failures
    pub async fn get_user_profile(&self) -> AppResult<Option<UserProfile>> {
        self.user.get_profile().await
    }

    /// User settings
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request or parse failures
    pub async fn get_user_settings(&self) -> AppResult<Option<UserSettings>> {
        self.user.get_user_settings().await
    }

    /// Personal information
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request failures
    pub async fn get_personal_info(&self) -> AppResult<Option<Value>> {
        self.user.get_personal_info().await
    }

    /// Fitness goals
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request failures
    pub async fn get_goals(&self) -> AppResult<Option<Value>> {
        self.user.get_goals().await
    }

    /// Registered devices
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request or parse failures
    pub async fn get_user_devices(&self) -> AppResult<Vec<Device>> {
        self.user.get_devices().await
    }

    /// Settings of one device
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request failures
    pub async fn get_device_settings(&self, device_id: u64) -> AppResult<Option<Value>> {
        self.user.get_device_settings(device_id).await
    }

    /// Profile, settings, goals, and devices
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_full_profile(&self) -> AppResult<FullProfile> {
        self.user.get_full_profile().await
    }

    // Activities

    /// Search activities
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_activities(&self, query: &ActivityQuery) -> AppResult<Vec<Activity>> {
        self.activities.get_activities(query).await
    }

    /// Most recent activities
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_recent_activities(&self, limit: u32) -> AppResult<Vec<Activity>> {
        self.activities.get_recent_activities(limit).await
    }

    /// All activities on `date`
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_activities_for_date(&self, date: NaiveDate) -> AppResult<Vec<Activity>> {
        self.activities.get_activities_for_date(date).await
    }

    /// Activities of one type
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
        self.activities
            .get_activities_by_type(activity_type, limit, start_date, end_date)
            .await
    }

    /// One activity by id
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown id, or a request or parse failure
    pub async fn get_activity(&self, activity_id: u64) -> AppResult<Activity> {
        self.activities.get_activity_by_id(activity_id).await
    }

    /// Full activity details as returned by the server
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails
    pub async fn get_activity_details(&self, activity_id: u64) -> AppResult<Value> {
        self.activities.get_activity_details(activity_id).await
    }

    /// Laps of one activity
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed
    pub async fn get_activity_laps(&self, activity_id: u64) -> AppResult<Vec<Lap>> {
        self.activities.get_activity_laps(activity_id).await
    }

    /// Time in each heart rate zone for one activity
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed
    pub async fn get_activity_hr_zones(&self, activity_id: u64) -> AppResult<Vec<HeartRateZone>> {
        self.activities.get_activity_hr_zones(activity_id).await
    }

    /// Activity totals for the week starting `week_start`
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails
    pub async fn get_weekly_activity_summary(
        &self,
        week_start: NaiveDate,
    ) -> AppResult<ActivityWeeklySummary> {
        self.activities.get_weekly_summary(week_start).await
    }

    // Sleep

    /// Sleep ending on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_sleep(&self, date: NaiveDate) -> AppResult<Option<SleepData>> {
        self.sleep.get_for_date(date).await
    }

    /// Sleep for every night in `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_sleep_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<SleepData>> {
        self.sleep.get_for_date_range(start, end).await
    }

    /// Sleep averages over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_sleep_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<SleepStats> {
        self.sleep.get_sleep_stats(start, end).await
    }

    /// Last night's sleep
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn sleep_today(&self) -> AppResult<Option<SleepData>> {
        self.get_sleep(local_today()).await
    }

    // Heart rate

    /// Heart rate on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_heart_rate(&self, date: NaiveDate) -> AppResult<Option<HeartRateData>> {
        self.heart_rate.get_for_date(date).await
    }

    /// Resting heart rate on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_resting_heart_rate(&self, date: NaiveDate) -> AppResult<Option<u32>> {
        self.heart_rate.get_resting_heart_rate(date).await
    }

    /// Timestamped heart rate readings on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_heart_rate_timeseries(
        &self,
        date: NaiveDate,
    ) -> AppResult<Vec<(DateTime<Utc>, u32)>> {
        self.heart_rate.get_heart_rate_timeseries(date).await
    }

    /// Resting heart rate per day over the `days` days ending on `end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_resting_hr_trend(
        &self,
        end: NaiveDate,
        days: u32,
    ) -> AppResult<Vec<(NaiveDate, Option<u32>)>> {
        self.heart_rate.get_resting_hr_trend(end, days).await
    }

    /// Heart rate statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_heart_rate_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<HeartRateStats> {
        self.heart_rate.get_heart_rate_stats(start, end).await
    }

    /// Today's heart rate
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn heart_rate_today(&self) -> AppResult<Option<HeartRateData>> {
        self.get_heart_rate(local_today()).await
    }

    // Stress

    /// Stress on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_stress(&self, date: NaiveDate) -> AppResult<Option<StressData>> {
        self.stress.get_for_date(date).await
    }

    /// Timestamped valid stress readings on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_stress_timeseries(
        &self,
        date: NaiveDate,
    ) -> AppResult<Vec<(DateTime<Utc>, i32)>> {
        self.stress.get_stress_timeseries(date).await
    }

    /// Stress statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_stress_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<StressStats> {
        self.stress.get_stress_stats(start, end).await
    }

    /// Body battery report for `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_body_battery(&self, date: NaiveDate) -> AppResult<Option<BodyBatteryReport>> {
        self.stress.get_body_battery(date).await
    }

    /// Today's stress
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn stress_today(&self) -> AppResult<Option<StressData>> {
        self.get_stress(local_today()).await
    }

    // Steps

    /// Steps on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_steps(&self, date: NaiveDate) -> AppResult<Option<StepsData>> {
        self.steps.get_for_date(date).await
    }

    /// Total steps on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_total_steps(&self, date: NaiveDate) -> AppResult<Option<u64>> {
        self.steps.get_total_steps(date).await
    }

    /// Intraday step samples on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_steps_timeseries(&self, date: NaiveDate) -> AppResult<Vec<StepsSample>> {
        self.steps.get_steps_timeseries(date).await
    }

    /// Step statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_steps_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<StepsStats> {
        self.steps.get_steps_stats(start, end).await
    }

    /// Floors ascended and descended on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_floors(&self, date: NaiveDate) -> AppResult<Option<(f64, f64)>> {
        self.steps.get_floors_for_date(date).await
    }

    /// Moderate and vigorous intensity minutes on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_intensity_minutes(&self, date: NaiveDate) -> AppResult<Option<(u32, u32)>> {
        self.steps.get_intensity_minutes(date).await
    }

    /// Today's steps
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn steps_today(&self) -> AppResult<Option<StepsData>> {
        self.get_steps(local_today()).await
    }

    // Daily summaries

    /// Daily summary for `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_daily_summary(&self, date: NaiveDate) -> AppResult<Option<DailySummary>> {
        self.daily.get_for_date(date).await
    }

    /// Daily summaries for `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_daily_summaries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailySummary>> {
        self.daily.get_for_date_range(start, end).await
    }

    /// Totals for the Monday-to-Sunday week starting `week_start`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weekly_summary(&self, week_start: NaiveDate) -> AppResult<DailyWeeklySummary> {
        self.daily.get_weekly_summary(week_start).await
    }

    /// Totals for a calendar month
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an invalid month, otherwise
    /// authentication-class errors only
    pub async fn get_monthly_summary(&self, year: i32, month: u32) -> AppResult<MonthlySummary> {
        self.daily.get_monthly_summary(year, month).await
    }

    /// Today's daily summary
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn daily_summary_today(&self) -> AppResult<Option<DailySummary>> {
        self.get_daily_summary(local_today()).await
    }

    // Body

    /// Day-view average weight on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weight(&self, date: NaiveDate) -> AppResult<Option<Weight>> {
        self.body.get_weight_for_date(date).await
    }

    /// Weight measurements in `start..=end`, oldest first
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weight_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Weight>> {
        self.body.get_weight_range(start, end).await
    }

    /// Most recent weight measurement
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_latest_weight(&self) -> AppResult<Option<Weight>> {
        self.body.get_latest_weight().await
    }

    /// Weight statistics over `start..=end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weight_stats(&self, start: NaiveDate, end: NaiveDate) -> AppResult<WeightStats> {
        self.body.get_weight_stats(start, end).await
    }

    /// Body composition on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_body_composition(&self, date: NaiveDate) -> AppResult<Option<BodyComposition>> {
        self.body.get_for_date(date).await
    }

    // Hydration and respiration

    /// Hydration on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_hydration(&self, date: NaiveDate) -> AppResult<Option<HydrationData>> {
        self.hydration.get_for_date(date).await
    }

    /// Respiration on `date`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_respiration(&self, date: NaiveDate) -> AppResult<Option<RespirationData>> {
        self.respiration.get_for_date(date).await
    }

    // Composite views

    /// Every domain for `date`
    ///
    /// Each domain is fetched independently; one that fails is logged and
    /// left `None`.
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_health_snapshot(&self, date: NaiveDate) -> AppResult<HealthSnapshot> {
        debug!(date = %date, "Building health snapshot");

        let snapshot = HealthSnapshot {
            date,
            daily_summary: self.daily.get_for_date(date).await?,
            sleep: self.sleep.get_for_date(date).await?,
            heart_rate: self
                .heart_rate
                .get_for_date(date)
                .await?
                .as_ref()
                .map(HeartRateSnapshot::from),
            stress: self
                .stress
                .get_for_date(date)
                .await?
                .as_ref()
                .map(StressSnapshot::from),
            steps: self
                .steps
                .get_for_date(date)
                .await?
                .as_ref()
                .map(StepsSnapshot::from),
            hydration: self
                .hydration
                .get_for_date(date)
                .await?
                .as_ref()
                .map(HydrationSnapshot::from),
            respiration: self
                .respiration
                .get_for_date(date)
                .await?
                .as_ref()
                .map(RespirationSnapshot::from),
        };

        info!(
            date = %date,
            domains = snapshot.domains_with_data(),
            "Health snapshot ready"
        );
        Ok(snapshot)
    }

    /// Today's health snapshot
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn health_snapshot_today(&self) -> AppResult<HealthSnapshot> {
        self.get_health_snapshot(local_today()).await
    }

    /// Report for the 7 days ending today
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_weekly_health_report(&self) -> AppResult<WeeklyHealthReport> {
        self.weekly_health_report_ending(local_today()).await
    }

    /// Report for the 7 days ending on `end`
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn weekly_health_report_ending(&self, end: NaiveDate) -> AppResult<WeeklyHealthReport> {
        let start = window_start(end, REPORT_DAYS);
        debug!(start = %start, end = %end, "Building weekly health report");

        let query = ActivityQuery::between(start, end).limit(REPORT_ACTIVITY_LIMIT);
        let activities = contain_default(
            "report_activities",
            self.activities.get_activities(&query).await,
        )?;

        Ok(WeeklyHealthReport {
            period: ReportPeriod { start, end },
            activities: ActivityReport::from_activities(&activities),
            sleep: SleepReport::from(&self.sleep.get_sleep_stats(start, end).await?),
            steps: StepsReport::from(&self.steps.get_steps_stats(start, end).await?),
            heart_rate: HeartRateReport::from(
                &self.heart_rate.get_heart_rate_stats(start, end).await?,
            ),
            stress: StressReport::from(&self.stress.get_stress_stats(start, end).await?),
        })
    }

    /// Export the selected domains for `start..=end`
    ///
    /// A domain that cannot be fetched is exported as an empty list.
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn export_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        options: ExportOptions,
    ) -> AppResult<ExportData> {
        let mut export = ExportData {
            period: ReportPeriod { start, end },
            activities: None,
            sleep: None,
            daily_summaries: None,
        };

        if options.activities {
            let query = ActivityQuery::between(start, end).limit(EXPORT_ACTIVITY_LIMIT);
            export.activities = Some(contain_default(
                "export_activities",
                self.activities.get_activities(&query).await,
            )?);
        }
        if options.sleep {
            export.sleep = Some(self.sleep.get_for_date_range(start, end).await?);
        }
        if options.daily {
            export.daily_summaries = Some(self.daily.get_for_date_range(start, end).await?);
        }

        info!(
            start = %start,
            end = %end,
            activities = export.activities.as_ref().map_or(0, Vec::len),
            sleep = export.sleep.as_ref().map_or(0, Vec::len),
            daily_summaries = export.daily_summaries.as_ref().map_or(0, Vec::len),
            "Export complete"
        );
        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(type_key: &str, seconds: f64, meters: f64) -> Activity {
        Activity {
            activity_type_key: type_key.to_owned(),
            duration_seconds: seconds,
            distance_meters: meters,
            calories: 300.0,
            ..Activity::default()
        }
    }

    #[test]
    fn test_activity_report() {
        let report = ActivityReport::from_activities(&[
            activity("running", 3600.0, 10_000.0),
            activity("cycling", 1800.0, 15_000.0),
            activity("running", 1800.0, 5_000.0),
        ])
        .unwrap();

        assert_eq!(report.count, 3);
        assert!((report.total_duration_hours - 2.0).abs() < 1e-9);
        assert!((report.total_distance_km - 30.0).abs() < 1e-9);
        assert!((report.total_calories - 900.0).abs() < 1e-9);
        assert_eq!(report.types, vec!["cycling".to_owned(), "running".to_owned()]);
    }

    #[test]
    fn test_activity_report_empty() {
        assert!(ActivityReport::from_activities(&[]).is_none());
    }

    #[test]
    fn test_steps_snapshot_uses_weighted_intensity() {
        let steps = StepsData::from_raw(&json!({
            "totalSteps": 11000,
            "dailyStepGoal": 10000,
            "totalDistanceMeters": 8500.0,
            "floorsAscended": 12.0,
            "moderateIntensityMinutes": 30,
            "vigorousIntensityMinutes": 10
        }))
        .unwrap();
        let snapshot = StepsSnapshot::from(&steps);

        assert_eq!(snapshot.total, 11000);
        assert!(snapshot.goal_reached);
        assert!((snapshot.distance_km - 8.5).abs() < 1e-9);
        assert_eq!(snapshot.intensity_minutes, 50);
    }

    #[test]
    fn test_snapshot_serializes_missing_domains_as_null() {
        let snapshot = HealthSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            daily_summary: None,
            sleep: None,
            heart_rate: Some(HeartRateSnapshot {
                resting: Some(52),
                ..HeartRateSnapshot::default()
            }),
            stress: None,
            steps: None,
            hydration: None,
            respiration: None,
        };
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["date"], "2024-01-15");
        assert!(value["hydration"].is_null());
        assert_eq!(value["heart_rate"]["resting"], 52);
        assert_eq!(snapshot.domains_with_data(), 1);
    }

    #[test]
    fn test_export_omits_excluded_domains() {
        let export = ExportData {
            period: ReportPeriod {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            },
            activities: Some(Vec::new()),
            sleep: None,
            daily_summaries: None,
        };
        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["period"]["start"], "2024-01-01");
        assert!(value["activities"].as_array().unwrap().is_empty());
        assert!(value.get("sleep").is_none());
        assert!(value.get("daily_summaries").is_none());
    }
}
