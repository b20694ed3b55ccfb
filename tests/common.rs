// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, mock-server configs, and pre-authenticated clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `garmer`
//!
//! Every helper points the client at a `wiremock` server and keeps token
//! files inside a temporary directory owned by the test.

use std::env;
use std::path::Path;
use std::sync::{Arc, Once};

use chrono::NaiveDate;
use garmer::auth::{SessionManager, SessionTokens};
use garmer::client::GarminClient;
use garmer::config::GarmerConfig;
use garmer::http_client::RetryConfig;
use tracing::Level;
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Display name stored with test tokens, used in sleep endpoint paths
pub const TEST_DISPLAY_NAME: &str = "test-user";

/// Access token installed by [`authenticated_session`]
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Config pointing every endpoint at `server`, with tokens under `token_dir`
pub fn test_config(server: &MockServer, token_dir: &Path) -> GarmerConfig {
    GarmerConfig {
        token_dir: token_dir.to_path_buf(),
        api_base_url: server.uri(),
        token_url: format!("{}/oauth/token", server.uri()),
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
        ..GarmerConfig::default()
    }
}

/// Retry policy with millisecond backoff
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_backoff_ms: 1,
        ..RetryConfig::default()
    }
}

/// Tokens that never expire and carry a cached display name
pub fn test_tokens() -> SessionTokens {
    let mut tokens = SessionTokens::new(TEST_ACCESS_TOKEN);
    tokens.display_name = Some(TEST_DISPLAY_NAME.to_owned());
    tokens
}

/// Session holding [`test_tokens`]
pub async fn authenticated_session(config: GarmerConfig) -> SessionManager {
    init_test_logging();
    let session = SessionManager::new(config).with_retry(fast_retry(2));
    session.restore(test_tokens()).await;
    session
}

/// Client over an [`authenticated_session`]
pub async fn authenticated_client(server: &MockServer, token_dir: &Path) -> GarminClient {
    let session = authenticated_session(test_config(server, token_dir)).await;
    GarminClient::with_session(Arc::new(session))
}

/// Parse a `YYYY-MM-DD` literal
pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}
