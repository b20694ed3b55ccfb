// ABOUTME: Login, logout, and status commands
// ABOUTME: Manages the saved session token file on behalf of the user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::process::ExitCode;

use garmer::client::GarminClient;
use garmer::config::GarmerConfig;
use tokio::fs;
use tracing::warn;

use crate::helpers::prompt::value_or_prompt;

/// Log in and save the session
pub async fn login(
    config: GarmerConfig,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<ExitCode> {
    let email = value_or_prompt(email, "Email")?;
    let password = value_or_prompt(password, "Password")?;

    match GarminClient::from_credentials(config, &email, &password, true).await {
        Ok(_) => {
            println!("Successfully logged in and saved authentication tokens.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Login failed: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Delete the saved session
pub async fn logout(config: GarmerConfig) -> anyhow::Result<ExitCode> {
    let token_path = config.token_path();
    if !fs::try_exists(&token_path).await.unwrap_or(false) {
        println!("No saved tokens found.");
        return Ok(ExitCode::SUCCESS);
    }

    GarminClient::new(config).logout(true).await;
    println!("Logged out and deleted saved tokens.");
    Ok(ExitCode::SUCCESS)
}

/// Report whether a saved session is usable
pub async fn status(config: GarmerConfig) -> anyhow::Result<ExitCode> {
    let Ok(client) = GarminClient::from_saved_tokens(config).await else {
        eprintln!("Not logged in. Use 'garmer login' to authenticate.");
        return Ok(ExitCode::FAILURE);
    };

    let profile = match client.get_user_profile().await {
        Ok(profile) => profile,
        Err(e) if e.is_authentication() => {
            eprintln!("Not logged in. Use 'garmer login' to authenticate.");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            warn!(error = %e, "Could not retrieve profile");
            None
        }
    };
    let name = match &profile {
        Some(profile) => profile
            .display_name
            .clone()
            .or_else(|| profile.email.clone()),
        None => client.session().display_name().await.ok(),
    };

    println!("Logged in as: {}", name.as_deref().unwrap_or("unknown"));
    if let Some(user_id) = profile.as_ref().and_then(|profile| profile.profile_id) {
        println!("User ID: {user_id}");
    }
    Ok(ExitCode::SUCCESS)
}
