// ABOUTME: Unified error handling with standard error codes for the garmer client
// ABOUTME: Defines ErrorCode, AppError, and the authentication error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in garmer returns [`AppResult`]. The error carries a
//! stable [`ErrorCode`] so callers can branch on the failure class without string
//! matching: authentication-class codes must reach the caller, everything else
//! can be contained at the smallest scope (one date, one domain).

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Standard error codes used throughout the client
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No session is available (never logged in, no saved tokens)
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    /// Credentials were rejected or the session could not be established
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid,
    /// A previously valid session was rejected by the server
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired,

    /// Caller supplied an invalid argument
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    /// A server response did not match any recognized shape
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat,

    /// The requested resource does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,

    /// The vendor API returned an error status or the transport failed
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError,
    /// The vendor API could not be reached
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable,
    /// The vendor API kept rate limiting after all retries
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited,

    /// Configuration could not be loaded or is invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,

    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
    /// Local file storage failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError,
    /// Serialization or deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required",
            Self::AuthInvalid => "Authentication failed",
            Self::AuthExpired => "The session has expired",
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidFormat => "The data format is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "The Garmin Connect API returned an error",
            Self::ExternalServiceUnavailable => "The Garmin Connect API is unavailable",
            Self::ExternalRateLimited => "The Garmin Connect API rate limit was exceeded",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether this code belongs to the authentication class
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired
        )
    }
}

/// Unified error type for the client
#[derive(Debug, thiserror::Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// True for `AuthenticationError` and its `SessionExpiredError` subtype
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        self.code.is_authentication()
    }

    /// True only for a session the server rejected after it was established
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        self.code == ErrorCode::AuthExpired
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Not authenticated and nothing to resume
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Session expired or revoked by the server
    #[must_use]
    pub fn session_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Session expired. Please log in again.")
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Unrecognized response shape
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Local storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Rate limit still in effect after all retries
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalRateLimited, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_is_authentication_subtype() {
        let error = AppError::session_expired();
        assert!(error.is_authentication());
        assert!(error.is_session_expired());

        let error = AppError::auth_required("no session");
        assert!(error.is_authentication());
        assert!(!error.is_session_expired());
    }

    #[test]
    fn test_non_auth_errors_are_containable() {
        assert!(!AppError::invalid_format("bad").is_authentication());
        assert!(!AppError::external_service("Garmin Connect", "500").is_authentication());
        assert!(!AppError::not_found("Activity 1").is_authentication());
    }

    #[test]
    fn test_display_includes_description_and_message() {
        let error = AppError::not_found("Activity 42");
        assert_eq!(
            error.to_string(),
            "The requested resource was not found: Activity 42 not found"
        );
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::AuthExpired).unwrap();
        assert_eq!(json, "\"AUTH_EXPIRED\"");
    }
}
