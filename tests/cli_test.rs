// ABOUTME: End-to-end tests for the garmer binary's exit codes and output streams
// ABOUTME: Runs the built executable against a temporary home and a mock API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::path::Path;
use std::process::{Command, Output};

use garmer::config::env_keys;
use garmer_core::constants::endpoints;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::test_tokens;

async fn run_garmer(home: &Path, api_base_url: &str, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_garmer"));
    command
        .args(args)
        .env("HOME", home)
        .env(env_keys::TOKEN_DIR, home.join("tokens"))
        .env(env_keys::API_BASE_URL, api_base_url)
        .env(env_keys::LOG_LEVEL, "error")
        .env_remove(env_keys::TOKEN_FILE)
        .env_remove(env_keys::LOG_FILE);
    tokio::task::spawn_blocking(move || command.output())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_status_without_session_reports_on_stderr() {
    let home = TempDir::new().unwrap();

    let output = run_garmer(home.path(), "http://127.0.0.1:9", &["status"]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not logged in. Use 'garmer login' to authenticate."));
}

#[tokio::test]
async fn test_summary_without_data_exits_nonzero() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    test_tokens()
        .save(&home.path().join("tokens").join("garmin_tokens"))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .and(query_param("calendarDate", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_garmer(
        home.path(),
        &server.uri(),
        &["summary", "--date", "2024-01-15"],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No data available for 2024-01-15"));
}
