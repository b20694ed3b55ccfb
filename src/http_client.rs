// ABOUTME: Shared HTTP client configuration and rate-limit retry for Garmin Connect requests
// ABOUTME: Builds reqwest clients from config timeouts and maps transport failures to AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::time::Duration;

use garmer_core::errors::{AppError, ErrorCode};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;
use tracing::warn;

use crate::config::GarmerConfig;

/// Service name used in transport error messages
pub const SERVICE_NAME: &str = "Garmin Connect";

/// Client using the timeouts from `config`
#[must_use]
pub fn build_client(config: &GarmerConfig) -> Client {
    configured_client(config.request_timeout_secs, config.connect_timeout_secs)
}

fn configured_client(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .user_agent(concat!("garmer/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a transport failure to an [`AppError`]
///
/// Connection failures and timeouts become `ExternalServiceUnavailable`,
/// everything else `ExternalServiceError`.
#[must_use]
pub fn transport_error(error: reqwest::Error) -> AppError {
    let code = if error.is_connect() || error.is_timeout() {
        ErrorCode::ExternalServiceUnavailable
    } else {
        ErrorCode::ExternalServiceError
    };
    AppError::new(code, format!("{SERVICE_NAME} request failed: {error}")).with_source(error)
}

/// Retry policy for rate-limited requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts before giving up
    pub max_retries: u32,
    /// Backoff before the first retry, doubled on each further retry
    pub initial_backoff_ms: u64,
    /// Statuses that trigger a retry
    pub retryable_status_codes: Vec<StatusCode>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            retryable_status_codes: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::SERVICE_UNAVAILABLE,
            ],
        }
    }
}

impl RetryConfig {
    /// Default policy with the retry budget from `config`
    #[must_use]
    pub fn from_config(config: &GarmerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            ..Self::default()
        }
    }

    fn is_retryable(&self, status: StatusCode) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

/// Send `request`, retrying with exponential backoff on retryable statuses
///
/// # Errors
///
/// Returns a transport error if sending fails, or `ExternalRateLimited` once
/// the retry budget is spent
pub async fn send_with_retry(
    retry: &RetryConfig,
    request: RequestBuilder,
) -> Result<Response, AppError> {
    let mut attempt = 0;

    loop {
        // Streaming bodies cannot be replayed
        let Some(attempt_request) = request.try_clone() else {
            return request.send().await.map_err(transport_error);
        };
        let response = attempt_request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !retry.is_retryable(status) {
            return Ok(response);
        }

        attempt += 1;
        if attempt >= retry.max_retries {
            return Err(AppError::rate_limited(format!(
                "{SERVICE_NAME} returned {status} after {attempt} attempts"
            )));
        }

        let backoff = retry.backoff(attempt);
        warn!(
            status = %status,
            attempt,
            max_retries = retry.max_retries,
            backoff_ms = backoff.as_millis(),
            "Rate limited by {SERVICE_NAME}, retrying"
        );
        sleep(backoff).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let retry = RetryConfig {
            initial_backoff_ms: 100,
            ..RetryConfig::default()
        };
        assert_eq!(retry.backoff(1), Duration::from_millis(100));
        assert_eq!(retry.backoff(2), Duration::from_millis(200));
        assert_eq!(retry.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_default_retryable_statuses() {
        let retry = RetryConfig::default();
        assert!(retry.is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(retry.is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!retry.is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
