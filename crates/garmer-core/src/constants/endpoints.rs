// ABOUTME: Garmin Connect API endpoint paths grouped by data domain
// ABOUTME: Paths are relative to the configured API base URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

/// Activity search (supports `startDate`, `endDate`, `limit`, `start`, `activityType`)
pub const ACTIVITY_SEARCH: &str = "/activitylist-service/activities/search/activities";

/// Single activity prefix; append `/{id}` and optionally `/details`, `/splits`, `/hrTimeInZones`
pub const ACTIVITY: &str = "/activity-service/activity";

/// Sleep data prefix; append `/{displayName}`
pub const DAILY_SLEEP: &str = "/wellness-service/wellness/dailySleepData";

/// Daily user summary (also carries the steps breakdown)
pub const DAILY_SUMMARY: &str = "/usersummary-service/usersummary/daily/";

/// Daily heart rate
pub const DAILY_HEART_RATE: &str = "/wellness-service/wellness/dailyHeartRate/";

/// Stress stats prefix; append `/{start}/{end}`
pub const DAILY_STRESS: &str = "/usersummary-service/stats/stress/daily";

/// Body battery daily reports
pub const BODY_BATTERY: &str = "/wellness-service/wellness/bodyBattery/reports/daily";

/// Weight summaries over a date range
pub const WEIGHT_RANGE: &str = "/weight-service/weight/dateRange";

/// Weight day view prefix; append `/{date}`
pub const WEIGHT_DAY_VIEW: &str = "/weight-service/weight/dayview";

/// Most recent weight measurement
pub const WEIGHT_LATEST: &str = "/weight-service/weight/latest";

/// Hydration stats prefix; append `/{start}/{end}`
pub const DAILY_HYDRATION: &str = "/usersummary-service/stats/hydration/daily";

/// Daily respiration
pub const DAILY_RESPIRATION: &str = "/wellness-service/wellness/dailyRespiration/";

/// Social profile of the authenticated user
pub const SOCIAL_PROFILE: &str = "/userprofile-service/socialProfile";

/// User settings and preferences
pub const USER_SETTINGS: &str = "/userprofile-service/userprofile/user-settings";

/// Personal information
pub const PERSONAL_INFO: &str = "/userprofile-service/userprofile/personal-information";

/// Fitness goals
pub const GOALS: &str = "/goal-service/goal/goals";

/// Registered devices
pub const DEVICES: &str = "/device-service/deviceregistration/devices";

/// Device settings prefix; append `/{deviceId}`
pub const DEVICE_SETTINGS: &str = "/device-service/deviceservice/device-info/settings";
