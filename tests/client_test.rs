// ABOUTME: Integration tests for range fetches, health snapshots, reports, and exports
// ABOUTME: Verifies failure containment per day and per domain against a mock API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use garmer::client::ExportOptions;
use garmer::extractors::dates_inclusive;
use garmer_core::constants::endpoints;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{authenticated_client, date, TEST_DISPLAY_NAME};

async fn mount_summary(server: &MockServer, day: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .and(query_param("calendarDate", day))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_range_skips_malformed_day_and_keeps_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for (index, day) in dates_inclusive(date("2024-01-01"), date("2024-01-07")).enumerate() {
        let day = day.to_string();
        let body = if index == 2 {
            json!("not a summary")
        } else {
            json!({"calendarDate": day, "totalSteps": (index + 1) * 1000})
        };
        mount_summary(&server, &day, body).await;
    }

    let client = authenticated_client(&server, dir.path()).await;
    let summaries = client
        .get_daily_summaries(date("2024-01-01"), date("2024-01-07"))
        .await
        .unwrap();

    let days: Vec<String> = summaries
        .iter()
        .map(|summary| summary.calendar_date.unwrap().to_string())
        .collect();
    assert_eq!(
        days,
        vec![
            "2024-01-01",
            "2024-01-02",
            "2024-01-04",
            "2024-01-05",
            "2024-01-06",
            "2024-01-07"
        ]
    );
    assert_eq!(summaries[2].total_steps, 4000);
}

#[tokio::test]
async fn test_null_day_is_no_data() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = authenticated_client(&server, dir.path()).await;
    assert!(client
        .get_daily_summary(date("2024-01-15"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_range_stops_on_expired_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_summary(&server, "2024-01-01", json!({"totalSteps": 1000})).await;
    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .and(query_param("calendarDate", "2024-01-02"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = authenticated_client(&server, dir.path()).await;
    let error = client
        .get_daily_summaries(date("2024-01-01"), date("2024-01-05"))
        .await
        .unwrap_err();
    assert!(error.is_session_expired());
}

#[tokio::test]
async fn test_snapshot_contains_failing_domain() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_summary(
        &server,
        "2024-01-15",
        json!({"calendarDate": "2024-01-15", "totalSteps": 12_000, "dailyStepGoal": 10_000}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/{TEST_DISPLAY_NAME}", endpoints::DAILY_SLEEP)))
        .and(query_param("date", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dailySleepDTO": {"calendarDate": "2024-01-15", "sleepTimeSeconds": 27_000}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_HEART_RATE))
        .and(query_param("date", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calendarDate": "2024-01-15",
            "restingHeartRate": 51,
            "maxHeartRate": 162
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!(
            "{}/2024-01-15/2024-01-15",
            endpoints::DAILY_STRESS
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"calendarDate": "2024-01-15", "avgStressLevel": 28, "maxStressLevel": 88}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_RESPIRATION))
        .and(query_param("date", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "calendarDate": "2024-01-15",
            "avgWakingRespirationValue": 14.0,
            "avgSleepingRespirationValue": 12.5
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!(
            "{}/2024-01-15/2024-01-15",
            endpoints::DAILY_HYDRATION
        )))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server, dir.path()).await;
    let snapshot = client.get_health_snapshot(date("2024-01-15")).await.unwrap();

    assert!(snapshot.hydration.is_none());
    assert_eq!(snapshot.daily_summary.as_ref().unwrap().total_steps, 12_000);
    assert_eq!(snapshot.sleep.as_ref().unwrap().total_sleep_seconds, 27_000);
    assert_eq!(snapshot.heart_rate.as_ref().unwrap().resting, Some(51));
    assert_eq!(snapshot.stress.as_ref().unwrap().avg_level, Some(28));
    let steps = snapshot.steps.as_ref().unwrap();
    assert_eq!(steps.total, 12_000);
    assert!(steps.goal_reached);
    assert_eq!(snapshot.respiration.as_ref().unwrap().avg_waking, Some(14.0));
    assert_eq!(snapshot.domains_with_data(), 6);

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["date"], "2024-01-15");
    assert!(value["hydration"].is_null());
}

#[tokio::test]
async fn test_activity_list_skips_entries_without_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(endpoints::ACTIVITY_SEARCH))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"activityId": 1, "activityName": "Run", "activityType": {"typeKey": "running"}},
            {"activityName": "Orphan"},
            {"activityId": 2, "activityName": "Ride", "activityType": {"typeKey": "cycling"}}
        ])))
        .mount(&server)
        .await;

    let client = authenticated_client(&server, dir.path()).await;
    let activities = client.get_recent_activities(10).await.unwrap();
    let ids: Vec<u64> = activities.iter().map(|a| a.activity_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_export_with_failing_domains() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(endpoints::ACTIVITY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"activityId": 10, "activityName": "Run", "activityType": {"typeKey": "running"}}
        ])))
        .mount(&server)
        .await;
    mount_summary(&server, "2024-01-01", json!({"totalSteps": 5000})).await;
    mount_summary(&server, "2024-01-02", json!({"totalSteps": 7000})).await;

    let client = authenticated_client(&server, dir.path()).await;
    let export = client
        .export_data(date("2024-01-01"), date("2024-01-02"), ExportOptions::default())
        .await
        .unwrap();

    assert_eq!(export.activities.as_ref().unwrap().len(), 1);
    assert!(export.sleep.as_ref().unwrap().is_empty());
    assert_eq!(export.daily_summaries.as_ref().unwrap().len(), 2);

    let options = ExportOptions {
        sleep: false,
        ..ExportOptions::default()
    };
    let partial = client
        .export_data(date("2024-01-01"), date("2024-01-02"), options)
        .await
        .unwrap();
    let value = serde_json::to_value(&partial).unwrap();
    assert!(value.get("sleep").is_none());
    assert!(value.get("activities").is_some());
    assert_eq!(value["period"]["start"], "2024-01-01");
}

#[tokio::test]
async fn test_weekly_report_without_activities() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(endpoints::ACTIVITY_SEARCH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = authenticated_client(&server, dir.path()).await;
    let report = client
        .weekly_health_report_ending(date("2024-01-21"))
        .await
        .unwrap();

    assert_eq!(report.period.start, date("2024-01-15"));
    assert_eq!(report.period.end, date("2024-01-21"));
    assert!(report.activities.is_none());
    assert_eq!(report.sleep.days_with_data, 0);
}
