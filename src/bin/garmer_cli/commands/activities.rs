// ABOUTME: Activity listing and activity detail commands
// ABOUTME: Lists recent or per-date activities and shows one activity with laps and zones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::process::ExitCode;

use chrono::NaiveDate;
use garmer::config::GarmerConfig;
use serde_json::{json, Value};

use super::connect;
use crate::helpers::display::{activity_json, print_activity_brief, print_activity_detailed};

/// Recent activities, or the activities of one date
pub async fn list(
    config: GarmerConfig,
    limit: u32,
    date: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let client = connect(config).await?;

    let (activities, title) = match date {
        Some(date) => (
            client.get_activities_for_date(date).await?,
            format!("Activities for {date}"),
        ),
        None => {
            let activities = client.get_recent_activities(limit).await?;
            let title = format!("Recent Activities ({})", activities.len());
            (activities, title)
        }
    };

    if activities.is_empty() {
        if json {
            println!("{}", json!({"activities": [], "count": 0}));
        } else {
            println!("No activities found.");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if json {
        let entries: Vec<Value> = activities
            .iter()
            .map(|activity| activity_json(activity, None, None))
            .collect();
        let data = json!({"count": entries.len(), "activities": entries});
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n=== {title} ===\n");
    for activity in &activities {
        print_activity_brief(activity);
    }
    Ok(ExitCode::SUCCESS)
}

/// One activity by id, or the latest
pub async fn detail(
    config: GarmerConfig,
    id: Option<u64>,
    laps: bool,
    zones: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let client = connect(config).await?;

    let activity = match id {
        Some(id) => match client.get_activity(id).await {
            Ok(activity) => activity,
            Err(e) if e.is_authentication() => return Err(e.into()),
            Err(e) => {
                eprintln!("Activity {id} not found: {e}");
                return Ok(ExitCode::FAILURE);
            }
        },
        None => {
            let Some(latest) = client.get_recent_activities(1).await?.into_iter().next() else {
                eprintln!("No activities found.");
                return Ok(ExitCode::FAILURE);
            };
            latest
        }
    };

    let lap_list = if laps {
        Some(client.get_activity_laps(activity.activity_id).await?)
    } else {
        None
    };
    let zone_list = if zones {
        Some(client.get_activity_hr_zones(activity.activity_id).await?)
    } else {
        None
    };

    if json {
        let data = activity_json(&activity, lap_list.as_deref(), zone_list.as_deref());
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print_activity_detailed(
            &activity,
            lap_list.as_deref().unwrap_or_default(),
            zone_list.as_deref().unwrap_or_default(),
        );
    }
    Ok(ExitCode::SUCCESS)
}
