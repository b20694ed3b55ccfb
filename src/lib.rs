// ABOUTME: Main library entry point for the garmer Garmin Connect client
// ABOUTME: Wires configuration, logging, session management, extractors, and the client facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

#![deny(unsafe_code)]

//! # Garmer
//!
//! A client library for Garmin Connect health and fitness data.
//!
//! ## Features
//!
//! - **Session management**: login, token persistence, refresh, and resume
//! - **Typed entities**: activities, sleep, heart rate, stress, steps, daily
//!   summaries, body composition, hydration, respiration, and user profile
//! - **Failure containment**: one unavailable day or domain never aborts a
//!   range fetch, snapshot, or export; only authentication errors propagate
//! - **Aggregates**: weekly and monthly summaries and per-domain statistics
//!
//! ## Architecture
//!
//! - **`garmer_core`**: errors, response normalizer, and typed entities
//! - **Auth**: [`auth::SessionManager`] owns the token and the authenticated
//!   request primitive
//! - **Extractors**: one per data domain, mapping endpoints to entities
//! - **Client**: [`client::GarminClient`] facade over every extractor
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use garmer::client::GarminClient;
//! use garmer::config::GarmerConfig;
//! use garmer_core::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let client = GarminClient::from_saved_tokens(GarmerConfig::load()).await?;
//!     let snapshot = client.health_snapshot_today().await?;
//!     println!("{} domains with data", snapshot.domains_with_data());
//!     Ok(())
//! }
//! ```

/// Session tokens, token providers, and the session manager
pub mod auth;

/// `GarminClient` facade, snapshots, reports, and exports
pub mod client;

/// Configuration loading from file and environment
pub mod config;

/// Per-domain data extractors
pub mod extractors;

/// Shared HTTP client and retry policy
pub mod http_client;

/// Structured logging setup
pub mod logging;

pub use auth::{create_auth, Credentials, SessionManager, SessionTokens, TokenProvider};
pub use client::{ExportData, ExportOptions, GarminClient, HealthSnapshot, WeeklyHealthReport};
pub use config::GarmerConfig;
pub use garmer_core::errors::{AppError, AppResult, ErrorCode};
