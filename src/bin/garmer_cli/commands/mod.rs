// ABOUTME: Command modules for the garmer CLI
// ABOUTME: Shares the saved-session client constructor used by every data command
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

pub mod activities;
pub mod daily;
pub mod export;
pub mod session;

use garmer::client::GarminClient;
use garmer::config::GarmerConfig;

/// Client resumed from the saved session
pub async fn connect(config: GarmerConfig) -> anyhow::Result<GarminClient> {
    Ok(GarminClient::from_saved_tokens(config).await?)
}
