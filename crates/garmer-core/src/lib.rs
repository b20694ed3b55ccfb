// ABOUTME: Core types for the garmer Garmin Connect client
// ABOUTME: Foundation crate with error handling, response normalization, and typed entities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

#![deny(unsafe_code)]

//! # Garmer Core
//!
//! Foundation crate for the garmer client. It has no I/O: everything here turns
//! already-fetched JSON into typed records and back.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Units, vendor defaults, and endpoint paths
//! - **conversions**: Clamped numeric casts and shared arithmetic
//! - **normalize**: Tolerant field access over loosely structured responses
//! - **models**: Activity, sleep, daily summary, and per-domain daily metrics

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Safe numeric conversions and arithmetic helpers
pub mod conversions;

/// Response normalization primitives
pub mod normalize;

/// Typed entities built from normalized responses
pub mod models;
