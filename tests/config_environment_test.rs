// ABOUTME: Integration tests for configuration file loading and environment overrides
// ABOUTME: Serialized because the overrides read process-wide environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::PathBuf;

use garmer::config::{env_keys, GarmerConfig, DEFAULT_API_BASE_URL};
use garmer_core::errors::ErrorCode;
use serial_test::serial;
use tempfile::TempDir;

const ALL_KEYS: [&str; 11] = [
    env_keys::TOKEN_DIR,
    env_keys::TOKEN_FILE,
    env_keys::LOG_LEVEL,
    env_keys::LOG_FORMAT,
    env_keys::LOG_FILE,
    env_keys::API_BASE_URL,
    env_keys::TOKEN_URL,
    env_keys::CLIENT_ID,
    env_keys::REQUEST_TIMEOUT,
    env_keys::CONNECT_TIMEOUT,
    env_keys::MAX_RETRIES,
];

fn clear_env() {
    for key in ALL_KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_env_overrides_apply() {
    clear_env();
    env::set_var(env_keys::TOKEN_DIR, "/tmp/garmer-tokens");
    env::set_var(env_keys::API_BASE_URL, "http://localhost:9000");
    env::set_var(env_keys::MAX_RETRIES, "5");
    env::set_var(env_keys::LOG_FILE, "/tmp/garmer.log");

    let config = GarmerConfig::default().with_env_overrides();
    clear_env();

    assert_eq!(config.token_dir, PathBuf::from("/tmp/garmer-tokens"));
    assert_eq!(config.api_base_url, "http://localhost:9000");
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.log_file, Some(PathBuf::from("/tmp/garmer.log")));
    assert_eq!(
        config.token_path(),
        PathBuf::from("/tmp/garmer-tokens/garmin_tokens")
    );
}

#[test]
#[serial]
fn test_unparseable_numeric_override_is_ignored() {
    clear_env();
    env::set_var(env_keys::REQUEST_TIMEOUT, "soon");
    env::set_var(env_keys::CONNECT_TIMEOUT, " 7 ");

    let config = GarmerConfig::default().with_env_overrides();
    clear_env();

    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.connect_timeout_secs, 7);
}

#[test]
#[serial]
fn test_file_then_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"log_level": "debug", "api_base_url": "http://file"}"#).unwrap();

    env::set_var(env_keys::LOG_LEVEL, "trace");
    let config = GarmerConfig::from_file(&path).with_env_overrides();
    clear_env();

    assert_eq!(config.log_level, "trace");
    assert_eq!(config.api_base_url, "http://file");
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "not json").unwrap();

    assert_eq!(GarmerConfig::from_file(&path), GarmerConfig::default());
    let error = GarmerConfig::try_from_file(&path).unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigError);
}

#[test]
fn test_missing_file_is_default() {
    let dir = TempDir::new().unwrap();
    let config = GarmerConfig::from_file(&dir.path().join("absent.json"));
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = GarmerConfig {
        max_retries: 9,
        log_format: "json".to_owned(),
        ..GarmerConfig::default()
    };

    config.save(&path).unwrap();
    assert_eq!(GarmerConfig::try_from_file(&path).unwrap(), config);
}
