// ABOUTME: Session manager owning the authenticated token state and the request primitive
// ABOUTME: Handles login, token persistence, refresh, and session-expired detection on 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use garmer_core::constants::endpoints;
use garmer_core::errors::{AppError, AppResult};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::provider::{OAuthTokenProvider, TokenProvider};
use super::tokens::SessionTokens;
use crate::config::GarmerConfig;
use crate::http_client::{
    build_client, send_with_retry, transport_error, RetryConfig, SERVICE_NAME,
};

/// Error message when no session is available
pub const NOT_AUTHENTICATED_MESSAGE: &str =
    "Not authenticated. Please call login() with your credentials first.";

/// Query parameters for [`SessionManager::request`]
pub type QueryParams<'a> = [(&'a str, String)];

/// Owns the session for one client
///
/// Authentication is binary: tokens are either present (authenticated) or
/// not. Readers clone the token out of the lock before any network call;
/// refresh and invalidation take the write lock.
pub struct SessionManager {
    config: GarmerConfig,
    http: Client,
    provider: Arc<dyn TokenProvider>,
    retry: RetryConfig,
    tokens: RwLock<Option<SessionTokens>>,
}

impl SessionManager {
    /// Session manager using the OAuth provider from `config`
    #[must_use]
    pub fn new(config: GarmerConfig) -> Self {
        let http = build_client(&config);
        let provider = Arc::new(OAuthTokenProvider::from_config(http.clone(), &config));
        Self::from_parts(config, http, provider)
    }

    /// Session manager with a custom token provider
    #[must_use]
    pub fn with_provider(config: GarmerConfig, provider: Arc<dyn TokenProvider>) -> Self {
        let http = build_client(&config);
        Self::from_parts(config, http, provider)
    }

    fn from_parts(config: GarmerConfig, http: Client, provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            http,
            retry: RetryConfig::from_config(&config),
            config,
            provider,
            tokens: RwLock::new(None),
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Configuration this session was built from
    #[must_use]
    pub const fn config(&self) -> &GarmerConfig {
        &self.config
    }

    /// Default token file location
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.config.token_path()
    }

    /// Whether tokens are loaded
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Install tokens obtained elsewhere
    pub async fn restore(&self, tokens: SessionTokens) {
        *self.tokens.write().await = Some(tokens);
    }

    /// Log in with credentials, optionally saving tokens to the default path
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the credentials are empty or rejected,
    /// or if the token endpoint cannot be reached
    pub async fn login(&self, email: &str, password: &str, save_tokens: bool) -> AppResult<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::auth_invalid("Email and password are required"));
        }

        let tokens = self.provider.login(email, password).await.map_err(|e| {
            if e.is_authentication() {
                e
            } else {
                AppError::auth_invalid(format!("Login failed: {}", e.message)).with_source(e)
            }
        })?;
        *self.tokens.write().await = Some(tokens);
        info!("Logged in to {SERVICE_NAME}");

        if save_tokens {
            self.save_tokens().await;
        }
        Ok(())
    }

    /// Write the current tokens to `path`
    ///
    /// Failures are logged and swallowed: the in-memory session stays usable.
    pub async fn save_session(&self, path: &Path) {
        let Some(tokens) = self.tokens.read().await.clone() else {
            debug!("No session to save");
            return;
        };
        match tokens.save(path).await {
            Ok(()) => debug!(path = %path.display(), "Saved session tokens"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to save session tokens"),
        }
    }

    /// Write the current tokens to the default path
    pub async fn save_tokens(&self) {
        self.save_session(&self.token_path()).await;
    }

    /// Load tokens saved at `path`, returning whether a session was resumed
    pub async fn resume_session(&self, path: &Path) -> bool {
        match SessionTokens::load(path).await {
            Ok(Some(tokens)) => {
                *self.tokens.write().await = Some(tokens);
                info!(path = %path.display(), "Resumed saved session");
                true
            }
            Ok(None) => {
                debug!(path = %path.display(), "No saved session");
                false
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to resume saved session");
                false
            }
        }
    }

    /// Load tokens from the default path
    pub async fn load_tokens(&self) -> bool {
        self.resume_session(&self.token_path()).await
    }

    /// Drop the session, optionally deleting the saved token file
    pub async fn logout(&self, delete_tokens: bool) {
        *self.tokens.write().await = None;
        if delete_tokens {
            let path = self.token_path();
            match fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Deleted saved tokens"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete saved tokens"),
            }
        }
        info!("Logged out");
    }

    /// Succeed when a session is loaded or can be resumed from the default path
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when there is no session to use
    pub async fn ensure_authenticated(&self) -> AppResult<()> {
        if self.is_authenticated().await || self.load_tokens().await {
            return Ok(());
        }
        Err(AppError::auth_required(NOT_AUTHENTICATED_MESSAGE))
    }

    /// Refresh the access token when it is about to expire
    ///
    /// Returns whether a refresh happened.
    ///
    /// # Errors
    ///
    /// Returns session-expired when the refresh is rejected; the session is
    /// invalidated first
    pub async fn refresh_if_needed(&self) -> AppResult<bool> {
        let Some(current) = self.tokens.read().await.clone() else {
            return Ok(false);
        };
        if !current.needs_refresh(Utc::now()) {
            return Ok(false);
        }

        debug!("Access token expiring, refreshing");
        match self.provider.refresh(&current).await {
            Ok(tokens) => {
                *self.tokens.write().await = Some(tokens);
                self.save_tokens().await;
                info!("Refreshed access token");
                Ok(true)
            }
            Err(e) => {
                self.invalidate().await;
                warn!(error = %e, "Token refresh failed, session invalidated");
                Err(AppError::session_expired().with_source(e))
            }
        }
    }

    async fn invalidate(&self) {
        *self.tokens.write().await = None;
    }

    /// Garmin display name, fetched from the social profile once and cached
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched or has no display name
    pub async fn display_name(&self) -> AppResult<String> {
        if let Some(name) = self
            .tokens
            .read()
            .await
            .as_ref()
            .and_then(|tokens| tokens.display_name.clone())
        {
            return Ok(name);
        }

        let profile = self.get(endpoints::SOCIAL_PROFILE, &[]).await?;
        let name = profile
            .get("displayName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::invalid_format("Social profile has no displayName"))?
            .to_owned();

        let cached = {
            let mut guard = self.tokens.write().await;
            if let Some(tokens) = guard.as_mut() {
                tokens.display_name = Some(name.clone());
                true
            } else {
                false
            }
        };
        if cached {
            self.save_tokens().await;
        }
        Ok(name)
    }

    /// `GET` an endpoint
    ///
    /// # Errors
    ///
    /// See [`SessionManager::request`]
    pub async fn get(&self, endpoint: &str, params: &QueryParams<'_>) -> AppResult<Value> {
        self.request(Method::GET, endpoint, params).await
    }

    /// Perform an authenticated API call and decode the JSON body
    ///
    /// An empty body decodes to `Value::Null`.
    ///
    /// # Errors
    ///
    /// - `AuthRequired` when there is no session
    /// - session-expired on 401, after invalidating the session
    /// - `ResourceNotFound` on 404, `ExternalServiceError` on other error statuses
    /// - `ExternalRateLimited` when rate limiting outlasts the retry budget
    /// - `InvalidFormat` when the body is not JSON
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: &QueryParams<'_>,
    ) -> AppResult<Value> {
        self.ensure_authenticated().await?;
        self.refresh_if_needed().await?;

        let authorization = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(SessionTokens::authorization_header)
            .ok_or_else(|| AppError::auth_required(NOT_AUTHENTICATED_MESSAGE))?;

        let url = self.config.api_url(endpoint);
        debug!(method = %method, url = %url, "API request");
        let request = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .query(params);
        let response = send_with_retry(&self.retry, request).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate().await;
            warn!(endpoint, "Session rejected by {SERVICE_NAME}");
            return Err(AppError::session_expired());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(endpoint));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("{status} for {endpoint}: {body}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(transport_error)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            AppError::invalid_format(format!("Response from {endpoint} is not JSON: {e}"))
                .with_source(e)
        })
    }
}
