// ABOUTME: Client configuration loaded from defaults, a JSON file, and GARMER_* environment variables
// ABOUTME: Owns token storage location, logging settings, API endpoints, and transport timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! Layered configuration: defaults, then `~/.garmer/config.json`, then the
//! environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use garmer_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Directory name under the home directory for tokens and config
pub const CONFIG_DIR_NAME: &str = ".garmer";
/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Default token file name
pub const DEFAULT_TOKEN_FILE: &str = "garmin_tokens";
/// Garmin Connect API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://connectapi.garmin.com";
/// OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://connectapi.garmin.com/oauth-service/oauth/token";
/// OAuth client id sent with token requests
pub const DEFAULT_CLIENT_ID: &str = "garmer";

/// Environment variable names
pub mod env_keys {
    /// Token directory override
    pub const TOKEN_DIR: &str = "GARMER_TOKEN_DIR";
    /// Token file name override
    pub const TOKEN_FILE: &str = "GARMER_TOKEN_FILE";
    /// Log level override
    pub const LOG_LEVEL: &str = "GARMER_LOG_LEVEL";
    /// Log format override (`json`, `pretty`, `compact`)
    pub const LOG_FORMAT: &str = "GARMER_LOG_FORMAT";
    /// Log file path
    pub const LOG_FILE: &str = "GARMER_LOG_FILE";
    /// API base URL override
    pub const API_BASE_URL: &str = "GARMER_API_BASE_URL";
    /// Token endpoint override
    pub const TOKEN_URL: &str = "GARMER_TOKEN_URL";
    /// OAuth client id override
    pub const CLIENT_ID: &str = "GARMER_CLIENT_ID";
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT: &str = "GARMER_REQUEST_TIMEOUT";
    /// Connect timeout in seconds
    pub const CONNECT_TIMEOUT: &str = "GARMER_CONNECT_TIMEOUT";
    /// Retry budget for rate-limited requests
    pub const MAX_RETRIES: &str = "GARMER_MAX_RETRIES";
}

/// `~/.garmer`, or `./.garmer` when no home directory is known
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.garmer/config.json`
#[must_use]
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarmerConfig {
    /// Directory holding the token file
    pub token_dir: PathBuf,
    /// Token file name inside `token_dir`
    pub token_file: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (json, pretty, compact)
    pub log_format: String,
    /// Optional log file; logs go to stderr when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Garmin Connect API base URL
    pub api_base_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// OAuth client id
    pub client_id: String,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Retries for rate-limited requests
    pub max_retries: u32,
}

impl Default for GarmerConfig {
    fn default() -> Self {
        Self {
            token_dir: default_config_dir(),
            token_file: DEFAULT_TOKEN_FILE.to_owned(),
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            log_file: None,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
        }
    }
}

impl GarmerConfig {
    /// Load from the default file, then apply environment overrides
    #[must_use]
    pub fn load() -> Self {
        Self::from_file(&default_config_path()).with_env_overrides()
    }

    /// Read a config file, falling back to defaults when it is missing or invalid
    #[must_use]
    pub fn from_file(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        Self::try_from_file(path)
            .inspect_err(|e| warn!(path = %path.display(), "Ignoring config file: {e}"))
            .unwrap_or_default()
    }

    /// Read a config file strictly
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config JSON
    pub fn try_from_file(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Cannot read {}: {e}", path.display())).with_source(e)
        })?;
        serde_json::from_str(&text).map_err(|e| {
            AppError::config(format!("Invalid config in {}: {e}", path.display())).with_source(e)
        })
    }

    /// Apply `GARMER_*` environment overrides
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_env_overrides();
        self
    }

    /// Apply `GARMER_*` environment overrides in place
    ///
    /// Numeric values that fail to parse keep the previous value.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var(env_keys::TOKEN_DIR) {
            self.token_dir = PathBuf::from(dir);
        }
        if let Ok(file) = env::var(env_keys::LOG_FILE) {
            self.log_file = Some(PathBuf::from(file));
        }
        override_from_env(env_keys::TOKEN_FILE, &mut self.token_file);
        override_from_env(env_keys::LOG_LEVEL, &mut self.log_level);
        override_from_env(env_keys::LOG_FORMAT, &mut self.log_format);
        override_from_env(env_keys::API_BASE_URL, &mut self.api_base_url);
        override_from_env(env_keys::TOKEN_URL, &mut self.token_url);
        override_from_env(env_keys::CLIENT_ID, &mut self.client_id);
        override_from_env(env_keys::REQUEST_TIMEOUT, &mut self.request_timeout_secs);
        override_from_env(env_keys::CONNECT_TIMEOUT, &mut self.connect_timeout_secs);
        override_from_env(env_keys::MAX_RETRIES, &mut self.max_retries);
    }

    /// Write the configuration as pretty JSON, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Full path of the token file
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.token_dir.join(&self.token_file)
    }

    /// Absolute URL for an API endpoint path
    #[must_use]
    pub fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a config error for invalid URLs, an empty token file name, or a zero timeout
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [("api_base_url", &self.api_base_url), ("token_url", &self.token_url)] {
            Url::parse(value.trim())
                .map_err(|e| AppError::config(format!("{name} is not a valid URL: {e}")))?;
        }
        if self.token_file.trim().is_empty() {
            return Err(AppError::config("token_file must not be empty"));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(AppError::config("timeouts must be greater than zero"));
        }
        Ok(())
    }
}

fn override_from_env<T: FromStr>(key: &str, target: &mut T) {
    let Ok(raw) = env::var(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key, value = %raw, "Ignoring unparseable environment override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GarmerConfig::default();
        assert_eq!(config.token_file, "garmin_tokens");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.token_path().ends_with(".garmer/garmin_tokens"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GarmerConfig =
            serde_json::from_str(r#"{"log_level": "debug", "max_retries": 5}"#).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_api_url_joins_single_slash() {
        let config = GarmerConfig {
            api_base_url: "http://localhost:8080/".to_owned(),
            ..GarmerConfig::default()
        };
        assert_eq!(
            config.api_url("/weight-service/weight/latest"),
            "http://localhost:8080/weight-service/weight/latest"
        );
    }

    #[test]
    fn test_validation_rejects_invalid_url() {
        let config = GarmerConfig {
            api_base_url: "not a url".to_owned(),
            ..GarmerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = GarmerConfig {
            request_timeout_secs: 0,
            ..GarmerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
