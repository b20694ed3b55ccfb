// ABOUTME: Token provider seam for exchanging credentials and refresh tokens with the vendor SSO
// ABOUTME: OAuthTokenProvider posts password and refresh-token grants to the configured token URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use async_trait::async_trait;
use garmer_core::errors::{AppError, AppResult};
use reqwest::Client;
use tracing::{debug, error};

use super::tokens::{SessionTokens, TokenResponse};
use crate::config::GarmerConfig;

/// Exchanges credentials for session tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Log in with email and password
    async fn login(&self, email: &str, password: &str) -> AppResult<SessionTokens>;

    /// Obtain fresh tokens using the refresh token in `tokens`
    async fn refresh(&self, tokens: &SessionTokens) -> AppResult<SessionTokens>;
}

/// OAuth2 password and refresh-token grants against a token endpoint
#[derive(Debug, Clone)]
pub struct OAuthTokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
}

impl OAuthTokenProvider {
    /// Provider posting to `token_url` with `client_id`
    pub fn new(client: Client, token_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
        }
    }

    /// Provider using the token endpoint from `config`
    #[must_use]
    pub fn from_config(client: Client, config: &GarmerConfig) -> Self {
        Self::new(client, config.token_url.clone(), config.client_id.clone())
    }

    async fn post_grant(&self, form: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                AppError::auth_invalid(format!("Token request failed: {e}")).with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Token endpoint rejected the request");
            return Err(AppError::auth_invalid(format!(
                "Token endpoint returned {status}"
            )));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            AppError::auth_invalid(format!("Unreadable token response: {e}")).with_source(e)
        })
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn login(&self, email: &str, password: &str) -> AppResult<SessionTokens> {
        debug!(token_url = %self.token_url, "Requesting password grant");
        let response = self
            .post_grant(&[
                ("grant_type", "password"),
                ("username", email),
                ("password", password),
                ("client_id", &self.client_id),
            ])
            .await?;
        Ok(response.into_tokens(None))
    }

    async fn refresh(&self, tokens: &SessionTokens) -> AppResult<SessionTokens> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| AppError::auth_invalid("No refresh token available"))?;

        debug!(token_url = %self.token_url, "Requesting refresh-token grant");
        let response = self
            .post_grant(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
            ])
            .await?;
        Ok(response.into_tokens(Some(tokens)))
    }
}
