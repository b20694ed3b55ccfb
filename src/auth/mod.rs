// ABOUTME: Authentication for Garmin Connect: session tokens, token providers, and the session manager
// ABOUTME: create_auth resumes saved tokens or logs in with provided credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! # Authentication
//!
//! A [`SessionManager`] is either authenticated or not. It becomes
//! authenticated through [`SessionManager::login`] or by resuming a saved token
//! file, and drops back on logout or when the server rejects the session.

mod provider;
mod session;
mod tokens;

pub use provider::{OAuthTokenProvider, TokenProvider};
pub use session::{QueryParams, SessionManager, NOT_AUTHENTICATED_MESSAGE};
pub use tokens::{SessionTokens, TokenResponse, REFRESH_THRESHOLD_MINUTES};

use std::fmt;

use garmer_core::errors::AppResult;
use tracing::debug;

use crate::config::GarmerConfig;

/// Email and password pair
#[derive(Clone)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Credentials from an email and password
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Build a session manager, resuming saved tokens when possible
///
/// Without saved tokens, logs in when `credentials` are given and
/// `auto_login` is set. Otherwise the manager is returned unauthenticated.
///
/// # Errors
///
/// Returns an authentication error if the automatic login fails
pub async fn create_auth(
    config: GarmerConfig,
    credentials: Option<&Credentials>,
    auto_login: bool,
) -> AppResult<SessionManager> {
    let session = SessionManager::new(config);
    if session.load_tokens().await {
        return Ok(session);
    }

    match credentials {
        Some(credentials) if auto_login => {
            session
                .login(&credentials.email, &credentials.password, true)
                .await?;
        }
        _ => debug!("No saved session and no automatic login"),
    }
    Ok(session)
}
