// ABOUTME: Session token state persisted between runs and the OAuth token response shape
// ABOUTME: Handles expiry checks and reading/writing the token file as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use garmer_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Refresh tokens that expire within this many minutes
pub const REFRESH_THRESHOLD_MINUTES: i64 = 5;

fn default_token_type() -> String {
    "Bearer".to_owned()
}

/// Authenticated session state, stored as the token file
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Access token sent on every request
    pub access_token: String,
    /// Refresh token, when the server issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Authorization scheme
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Cached Garmin display name, used in some endpoint paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl SessionTokens {
    /// Bearer tokens without expiry or refresh token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_at: None,
            display_name: None,
        }
    }

    /// `Authorization` header value
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Whether the access token expires within `threshold` of `now`
    #[must_use]
    pub fn expires_within(&self, threshold: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= now + threshold)
    }

    /// Whether a refresh is due and possible
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_some()
            && self.expires_within(Duration::minutes(REFRESH_THRESHOLD_MINUTES), now)
    }

    /// Read a token file, `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub async fn load(path: &Path) -> AppResult<Option<Self>> {
        if !fs::try_exists(path).await? {
            return Ok(None);
        }
        let text = fs::read_to_string(path).await?;
        let tokens = serde_json::from_str(&text).map_err(|e| {
            AppError::storage(format!("Unreadable token file {}: {e}", path.display()))
                .with_source(e)
        })?;
        Ok(Some(tokens))
    }

    /// Write the token file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub async fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?).await?;
        Ok(())
    }
}

/// OAuth token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// New access token
    pub access_token: String,
    /// New refresh token, absent when the old one stays valid
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Authorization scheme
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry as Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl TokenResponse {
    /// Convert into session tokens, keeping `previous` values the response omits
    #[must_use]
    pub fn into_tokens(self, previous: Option<&SessionTokens>) -> SessionTokens {
        let expires_at = self
            .expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs))
            });

        SessionTokens {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|tokens| tokens.refresh_token.clone())),
            token_type: self.token_type.unwrap_or_else(default_token_type),
            expires_at,
            display_name: previous.and_then(|tokens| tokens.display_name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_refresh_only_with_refresh_token() {
        let now = Utc::now();
        let mut tokens = SessionTokens::new("abc");
        tokens.expires_at = Some(now + Duration::minutes(2));
        assert!(!tokens.needs_refresh(now));

        tokens.refresh_token = Some("refresh".to_owned());
        assert!(tokens.needs_refresh(now));

        tokens.expires_at = Some(now + Duration::hours(1));
        assert!(!tokens.needs_refresh(now));
    }

    #[test]
    fn test_refresh_response_keeps_previous_refresh_token() {
        let mut previous = SessionTokens::new("old");
        previous.refresh_token = Some("keep-me".to_owned());
        previous.display_name = Some("runner42".to_owned());

        let response = TokenResponse {
            access_token: "new".to_owned(),
            refresh_token: None,
            token_type: None,
            expires_in: Some(3600),
            expires_at: None,
        };
        let tokens = response.into_tokens(Some(&previous));
        assert_eq!(tokens.access_token, "new");
        assert_eq!(tokens.refresh_token.as_deref(), Some("keep-me"));
        assert_eq!(tokens.display_name.as_deref(), Some("runner42"));
        assert!(tokens.expires_at.is_some());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let tokens = SessionTokens::new("super-secret");
        assert!(!format!("{tokens:?}").contains("super-secret"));
    }
}
