// ABOUTME: User extractor for profile, settings, goals, and device endpoints
// ABOUTME: Each call is independent; the full profile contains per-part failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use garmer_core::constants::endpoints;
use garmer_core::errors::AppResult;
use garmer_core::models::{Device, UserProfile, UserSettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::contain_default;
use crate::auth::SessionManager;

/// Profile, settings, goals, and devices gathered in one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullProfile {
    /// Social profile
    pub profile: Option<UserProfile>,
    /// User settings
    pub settings: Option<UserSettings>,
    /// Goals as returned by the goal service
    pub goals: Option<Value>,
    /// Registered devices
    pub devices: Vec<Device>,
}

/// Account-level data not keyed by date
#[derive(Clone)]
pub struct UserExtractor {
    session: Arc<SessionManager>,
}

impl UserExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    async fn get_optional(&self, endpoint: &str) -> AppResult<Option<Value>> {
        let raw = self.session.get(endpoint, &[]).await?;
        Ok((!raw.is_null()).then_some(raw))
    }

    /// Social profile of the logged-in user
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request or parse failures
    pub async fn get_profile(&self) -> AppResult<Option<UserProfile>> {
        self.get_optional(endpoints::SOCIAL_PROFILE)
            .await?
            .map(|raw| UserProfile::from_raw(&raw).map_err(Into::into))
            .transpose()
    }

    /// Units and physiology settings
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request or parse failures
    pub async fn get_user_settings(&self) -> AppResult<Option<UserSettings>> {
        self.get_optional(endpoints::USER_SETTINGS)
            .await?
            .map(|raw| UserSettings::from_raw(&raw).map_err(Into::into))
            .transpose()
    }

    /// Personal information as returned by the profile service
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request failures
    pub async fn get_personal_info(&self) -> AppResult<Option<Value>> {
        self.get_optional(endpoints::PERSONAL_INFO).await
    }

    /// Fitness goals as returned by the goal service
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request failures
    pub async fn get_goals(&self) -> AppResult<Option<Value>> {
        self.get_optional(endpoints::GOALS).await
    }

    /// Registered devices; a non-list response yields an empty list
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request or parse failures
    pub async fn get_devices(&self) -> AppResult<Vec<Device>> {
        let raw = self.session.get(endpoints::DEVICES, &[]).await?;
        let Value::Array(items) = raw else {
            debug!("Device list response is not a list");
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .map(Device::from_raw)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Settings of one device
    ///
    /// # Errors
    ///
    /// Returns authentication errors and request failures
    pub async fn get_device_settings(&self, device_id: u64) -> AppResult<Option<Value>> {
        self.get_optional(&format!("{}/{device_id}", endpoints::DEVICE_SETTINGS))
            .await
    }

    /// Profile, settings, goals, and devices; a failing part is left empty
    ///
    /// # Errors
    ///
    /// Returns authentication-class errors only
    pub async fn get_full_profile(&self) -> AppResult<FullProfile> {
        Ok(FullProfile {
            profile: contain_default("profile", self.get_profile().await)?,
            settings: contain_default("user_settings", self.get_user_settings().await)?,
            goals: contain_default("goals", self.get_goals().await)?,
            devices: contain_default("devices", self.get_devices().await)?,
        })
    }
}
