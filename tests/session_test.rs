// ABOUTME: Integration tests for login, token persistence, refresh, and session expiry
// ABOUTME: Drives the session manager against a mock token endpoint and API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use garmer::auth::{SessionManager, SessionTokens};
use garmer::client::GarminClient;
use garmer_core::constants::endpoints;
use garmer_core::errors::ErrorCode;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{authenticated_client, date, init_test_logging, test_config, test_tokens};

async fn mount_daily_summary(server: &MockServer, bearer: &str) {
    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .and(header("authorization", format!("Bearer {bearer}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"calendarDate": "2024-01-15", "totalSteps": 9000})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_saves_tokens_and_resumes() {
    init_test_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "refresh_token": "refresh-1",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_daily_summary(&server, "fresh-token").await;

    let client = GarminClient::new(config.clone());
    client
        .login("runner@example.com", "secret", true)
        .await
        .unwrap();
    assert!(client.is_authenticated().await);
    assert!(config.token_path().exists());

    let resumed = GarminClient::from_saved_tokens(config).await.unwrap();
    let summary = resumed
        .get_daily_summary(date("2024-01-15"))
        .await
        .unwrap()
        .expect("summary");
    assert_eq!(summary.total_steps, 9000);
}

#[tokio::test]
async fn test_rejected_login_is_auth_invalid() {
    init_test_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let error = GarminClient::from_credentials(config.clone(), "runner@example.com", "wrong", true)
        .await
        .err()
        .expect("login should fail");
    assert_eq!(error.code, ErrorCode::AuthInvalid);
    assert!(!config.token_path().exists());
}

#[tokio::test]
async fn test_empty_credentials_rejected_without_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = GarminClient::new(test_config(&server, dir.path()));

    let error = client.login("  ", "secret", false).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthInvalid);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_from_saved_tokens_without_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let error = GarminClient::from_saved_tokens(test_config(&server, dir.path()))
        .await
        .err()
        .expect("no saved session");
    assert_eq!(error.code, ErrorCode::AuthRequired);
    assert!(error.is_authentication());
}

#[tokio::test]
async fn test_save_and_resume_session_at_path() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tokens.json");

    let session = SessionManager::new(test_config(&server, dir.path()));
    session.restore(test_tokens()).await;
    session.save_session(&path).await;
    assert!(path.exists());

    let other = SessionManager::new(test_config(&server, dir.path()));
    assert!(other.resume_session(&path).await);
    assert!(other.is_authenticated().await);
    assert_eq!(other.display_name().await.unwrap(), common::TEST_DISPLAY_NAME);

    assert!(!other.resume_session(&dir.path().join("missing")).await);
}

#[tokio::test]
async fn test_unauthorized_response_expires_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server, dir.path()).await;
    let error = client
        .get_daily_summary(date("2024-01-15"))
        .await
        .unwrap_err();
    assert!(error.is_session_expired());
    assert!(!client.is_authenticated().await);

    // Nothing to resume, so the next call fails before reaching the server
    let error = client
        .get_daily_summary(date("2024-01-16"))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthRequired);
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_before_request() {
    init_test_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "renewed-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_daily_summary(&server, "renewed-token").await;

    let mut tokens = SessionTokens::new("stale-token");
    tokens.refresh_token = Some("refresh-1".to_owned());
    tokens.expires_at = Some(Utc::now() - Duration::minutes(1));

    let session = SessionManager::new(config.clone());
    session.restore(tokens).await;
    let client = GarminClient::with_session(Arc::new(session));

    let summary = client.get_daily_summary(date("2024-01-15")).await.unwrap();
    assert!(summary.is_some());

    let saved = SessionTokens::load(&config.token_path()).await.unwrap().unwrap();
    assert_eq!(saved.access_token, "renewed-token");
    assert_eq!(saved.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_rejected_refresh_expires_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(endpoints::DAILY_SUMMARY))
        .and(query_param("calendarDate", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut tokens = SessionTokens::new("stale-token");
    tokens.refresh_token = Some("revoked".to_owned());
    tokens.expires_at = Some(Utc::now() - Duration::minutes(1));

    let session = SessionManager::new(test_config(&server, dir.path()));
    session.restore(tokens).await;

    let error = session.refresh_if_needed().await.unwrap_err();
    assert!(error.is_session_expired());
    assert!(!session.is_authenticated().await);
}
