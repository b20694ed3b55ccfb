// ABOUTME: garmer CLI - command-line access to Garmin Connect health and activity data
// ABOUTME: Parses subcommands, initializes logging, and maps failures to exit codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
//!
//! Usage:
//! ```bash
//! # Log in and save the session
//! garmer login --email you@example.com
//!
//! # Yesterday's daily summary, with last night's sleep, as JSON
//! garmer summary --with-sleep --json
//!
//! # Details of the latest activity with laps
//! garmer activity --laps
//!
//! # Export the last 30 days
//! garmer export --days 30 --output export.json
//! ```

mod commands;
mod helpers;

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use garmer::config::GarmerConfig;
use garmer::logging::init_from_config;
use garmer_core::errors::AppError;

/// Printed when a command needs a session and none is usable
const NOT_LOGGED_IN: &str = "Not logged in. Use 'garmer login' first.";

#[derive(Parser)]
#[command(
    name = "garmer",
    about = "Garmin Connect data extraction tool",
    long_about = "Fetches daily summaries, sleep, activities, and health snapshots from Garmin Connect."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Log in to Garmin Connect and save the session
    Login {
        /// Garmin Connect email (prompted when omitted)
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Garmin Connect password (prompted when omitted)
        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Log out and delete saved tokens
    Logout,

    /// Show authentication status
    Status,

    /// Show the daily summary
    Summary {
        /// Date (YYYY-MM-DD), defaults to yesterday
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Include the night's sleep
        #[arg(long, short = 's')]
        with_sleep: bool,
    },

    /// Show sleep data
    Sleep {
        /// Date (YYYY-MM-DD), defaults to yesterday
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// List recent activities
    Activities {
        /// Number of activities
        #[arg(long, short = 'n', default_value = "10")]
        limit: u32,

        /// Activities on a specific date (YYYY-MM-DD)
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show detailed activity information
    Activity {
        /// Activity ID (omit for the latest)
        id: Option<u64>,

        /// Include lap data
        #[arg(long)]
        laps: bool,

        /// Include heart rate zone data
        #[arg(long)]
        zones: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a health snapshot
    Snapshot {
        /// Date (YYYY-MM-DD), defaults to yesterday
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export data to a JSON file
    Export {
        /// Start date (YYYY-MM-DD)
        #[arg(long, short = 's')]
        start_date: Option<NaiveDate>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long, short = 'e')]
        end_date: Option<NaiveDate>,

        /// Number of days when no start date is given
        #[arg(long, short = 'n', default_value = "7")]
        days: u32,

        /// Output file path
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Show version information
    Version,
}

async fn run(command: Command, config: GarmerConfig) -> anyhow::Result<ExitCode> {
    match command {
        Command::Login { email, password } => commands::session::login(config, email, password).await,
        Command::Logout => commands::session::logout(config).await,
        Command::Status => commands::session::status(config).await,
        Command::Summary {
            date,
            json,
            with_sleep,
        } => commands::daily::summary(config, date, json, with_sleep).await,
        Command::Sleep { date } => commands::daily::sleep(config, date).await,
        Command::Activities { limit, date, json } => {
            commands::activities::list(config, limit, date, json).await
        }
        Command::Activity {
            id,
            laps,
            zones,
            json,
        } => commands::activities::detail(config, id, laps, zones, json).await,
        Command::Snapshot { date, json } => commands::daily::snapshot(config, date, json).await,
        Command::Export {
            start_date,
            end_date,
            days,
            output,
        } => commands::export::export(config, start_date, end_date, days, output).await,
        Command::Version => {
            println!("garmer {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = GarmerConfig::load();

    if let Err(e) = init_from_config(&config, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<AppError>() {
                Some(app_error) if app_error.is_authentication() => eprintln!("{NOT_LOGGED_IN}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
