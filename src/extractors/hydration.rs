// ABOUTME: Hydration extractor for the daily hydration stats endpoint
// ABOUTME: Reads the first element of the single-day stats list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use garmer_core::constants::endpoints;
use garmer_core::errors::AppResult;
use garmer_core::models::HydrationData;
use garmer_core::normalize::format_calendar_date;

use super::{first_element, DateExtractor};
use crate::auth::SessionManager;

/// Daily water intake
#[derive(Clone)]
pub struct HydrationExtractor {
    session: Arc<SessionManager>,
}

impl HydrationExtractor {
    /// Extractor using `session`
    #[must_use]
    pub const fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DateExtractor for HydrationExtractor {
    type Item = HydrationData;

    fn domain(&self) -> &'static str {
        "hydration"
    }

    async fn fetch_for_date(&self, date: NaiveDate) -> AppResult<Option<HydrationData>> {
        let day = format_calendar_date(date);
        let raw = self
            .session
            .get(&format!("{}/{day}/{day}", endpoints::DAILY_HYDRATION), &[])
            .await?;
        Ok(first_element(&raw, "HydrationData")?
            .map(HydrationData::from_raw)
            .transpose()?)
    }
}
