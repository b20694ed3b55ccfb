// ABOUTME: Export command writing activities, sleep, and daily summaries to a JSON file
// ABOUTME: Defaults to the trailing window of days ending today
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use garmer::client::ExportOptions;
use garmer::config::GarmerConfig;
use tokio::fs;

use super::connect;
use crate::helpers::dates::export_range;

fn default_output(start: NaiveDate, end: NaiveDate) -> PathBuf {
    PathBuf::from(format!("garmin_export_{start}_{end}.json"))
}

/// Export a date range to JSON
pub async fn export(
    config: GarmerConfig,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    days: u32,
    output: Option<String>,
) -> anyhow::Result<ExitCode> {
    let client = connect(config).await?;
    let (start, end) = export_range(start, end, days);
    let path = output.map_or_else(|| default_output(start, end), PathBuf::from);

    println!("Exporting data from {start} to {end}...");
    let data = client
        .export_data(start, end, ExportOptions::default())
        .await?;

    let body = serde_json::to_string_pretty(&data).context("Failed to serialize export")?;
    fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Exported data to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_name() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(
            default_output(start, end),
            PathBuf::from("garmin_export_2024-01-01_2024-01-07.json")
        );
    }
}
