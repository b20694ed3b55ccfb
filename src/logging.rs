// ABOUTME: Logging configuration and structured logging setup for the client and CLI
// ABOUTME: Configures log levels, formatters, and stderr or file output through tracing-subscriber
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

//! Structured logging with `tracing`
//!
//! Stdout belongs to CLI and JSON output, so logs always go to stderr or to a
//! configured file.

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, Level};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{env_keys, GarmerConfig};

/// Service name reported in startup logs
pub const SERVICE_NAME: &str = "garmer";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Append to this file instead of writing to stderr
    pub log_file: Option<PathBuf>,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
}

/// Log output format options
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` lines for machine consumption
    Json,
    /// Multi-field human readable output
    Pretty,
    /// Single-line output
    Compact,
}

impl LogFormat {
    /// Parse a format name, defaulting to [`LogFormat::Pretty`]
    #[must_use]
    pub fn from_str_or_default(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            log_file: None,
            service_name: SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: env::var("LOG_FORMAT")
                .map_or(LogFormat::Pretty, |name| LogFormat::from_str_or_default(&name)),
            include_location: env::var("LOG_INCLUDE_LOCATION").is_ok(),
            log_file: env::var(env_keys::LOG_FILE).ok().map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Create logging configuration from the client configuration
    #[must_use]
    pub fn from_config(config: &GarmerConfig) -> Self {
        Self {
            level: config.log_level.clone(),
            format: LogFormat::from_str_or_default(&config.log_format),
            log_file: config.log_file.clone(),
            ..Self::default()
        }
    }

    /// Raise the level to `debug` (CLI `--verbose`)
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.level = "debug".into();
        self
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or a global
    /// subscriber is already installed
    pub fn init(&self) -> Result<()> {
        // RUST_LOG wins over the configured level, noise reduction always applies
        let env_filter = env::var("RUST_LOG")
            .map_or_else(|_| EnvFilter::new(&self.level), EnvFilter::new)
            .add_directive(
                "hyper=warn"
                    .parse()
                    .unwrap_or_else(|_| Level::WARN.into()),
            )
            .add_directive(
                "reqwest=warn"
                    .parse()
                    .unwrap_or_else(|_| Level::WARN.into()),
            )
            .add_directive(
                "rustls=warn"
                    .parse()
                    .unwrap_or_else(|_| Level::WARN.into()),
            )
            .add_directive(
                format!("garmer={}", self.level)
                    .parse()
                    .unwrap_or_else(|_| Level::INFO.into()),
            );

        let registry = tracing_subscriber::registry().with(env_filter);
        let to_file = self.log_file.is_some();

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(self.make_writer()?)
                    .with_span_events(FmtSpan::NONE)
                    .json();
                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_ansi(!to_file)
                    .with_writer(self.make_writer()?)
                    .with_span_events(FmtSpan::NONE);
                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_file(false)
                    .with_line_number(false)
                    .with_target(false)
                    .with_ansi(!to_file)
                    .with_writer(self.make_writer()?)
                    .with_span_events(FmtSpan::NONE);
                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn make_writer(&self) -> Result<BoxMakeWriter> {
        let Some(path) = &self.log_file else {
            return Ok(BoxMakeWriter::new(io::stderr));
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(BoxMakeWriter::new(Arc::new(file)))
    }

    fn log_startup_info(&self) {
        debug!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = ?self.format,
            log.file = ?self.log_file,
            "Logging initialized"
        );
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Initialize logging from the client configuration
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_config(config: &GarmerConfig, verbose: bool) -> Result<()> {
    let logging = LoggingConfig::from_config(config);
    let logging = if verbose { logging.verbose() } else { logging };
    logging.init()?;
    info!(version = env!("CARGO_PKG_VERSION"), "garmer starting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_str_or_default("fancy"), LogFormat::Pretty);
    }

    #[test]
    fn test_from_config_and_verbose() {
        let config = GarmerConfig {
            log_level: "warn".to_owned(),
            log_format: "json".to_owned(),
            ..GarmerConfig::default()
        };
        let logging = LoggingConfig::from_config(&config);
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.verbose().level, "debug");
    }
}
