// ABOUTME: Respiration extractor for the daily respiration endpoint
// ABOUTME: Maps the waking and sleeping breathing-rate summary for one date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use garmer_core::constants::endpoints;
use garmer_core::errors::AppResult;
use garmer_core::models::RespirationData;
use garmer_core::normalize::format_calendar_date;

use super::DateExtractor;
use crate::auth::SessionManager;

/// Daily respiration
#[derive(Clone)]
pub struct RespirationExtractor {
    session: Arc<SessionManager>,
}

impl RespirationExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DateExtractor for RespirationExtractor {
    type Item = RespirationData;

    fn domain(&self) -> &'static str {
        "respiration"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<RespirationData>> {
        let raw = self
            .session
            .get(
                endpoints::DAILY_RESPIRATION,
                &[("date", format_calendar_date(date))],
            )
            .await?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(RespirationData::from_raw(&raw)?))
    }
}
