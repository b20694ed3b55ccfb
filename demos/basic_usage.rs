// ABOUTME: Walkthrough of the garmer library against a saved Garmin Connect session
// ABOUTME: Prints profile, daily, sleep, stress, activity, weight, and weekly report data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
//! Basic garmer usage
//!
//! Run `garmer login` once, then:
//! ```bash
//! cargo run --example basic_usage
//! ```
//! Set `GARMIN_EMAIL` and `GARMIN_PASSWORD` to log in from this program instead.

use std::env;

use anyhow::Result;
use chrono::Days;
use garmer::client::{ExportOptions, GarminClient};
use garmer::config::GarmerConfig;
use garmer::extractors::local_today;
use garmer::logging::init_from_config;

async fn connect(config: GarmerConfig) -> Result<GarminClient> {
    let client = match (env::var("GARMIN_EMAIL"), env::var("GARMIN_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            GarminClient::from_credentials(config, &email, &password, true).await?
        }
        _ => GarminClient::from_saved_tokens(config).await?,
    };
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GarmerConfig::load();
    init_from_config(&config, false)?;

    let client = connect(config).await?;
    let today = local_today();
    let yesterday = today.pred_opt().unwrap_or(today);

    println!("=== User Profile ===");
    if let Some(profile) = client.get_user_profile().await? {
        println!("Name: {}", profile.display_name.as_deref().unwrap_or("-"));
        println!("Email: {}", profile.email.as_deref().unwrap_or("-"));
        if let Some(height) = profile.height_cm {
            println!("Height: {height} cm");
        }
        if let Some(weight) = profile.weight_kg {
            println!("Weight: {weight} kg");
        }
    }

    println!("\n=== Yesterday's Summary ===");
    if let Some(summary) = client.get_daily_summary(yesterday).await? {
        println!("Steps: {} / {}", summary.total_steps, summary.daily_step_goal);
        println!("Calories: {}", summary.total_kilocalories);
        println!("Distance: {:.2} km", summary.total_distance_km());
        println!("Floors: {:.0}", summary.floors_ascended);
        if let Some(resting) = summary.resting_heart_rate {
            println!("Resting HR: {resting} bpm");
        }
    }

    println!("\n=== Last Night's Sleep ===");
    if let Some(sleep) = client.get_sleep(yesterday).await? {
        println!("Total Sleep: {:.1} hours", sleep.total_sleep_hours());
        println!("Deep Sleep: {:.1} hours", sleep.deep_sleep_hours());
        println!("REM Sleep: {:.1} hours", sleep.rem_sleep_hours());
        if let Some(score) = sleep.overall_score {
            println!("Sleep Score: {score}");
        }
        if let Some(heart_rate) = sleep.avg_sleep_heart_rate {
            println!("Avg HR during sleep: {heart_rate} bpm");
        }
    }

    println!("\n=== Stress ===");
    if let Some(stress) = client.get_stress(yesterday).await? {
        if let Some(level) = stress.avg_stress_level {
            println!("Average Stress: {level}");
        }
        println!("Rest Time: {:.1} hours", stress.rest_duration_hours());
        println!("High Stress Time: {:.1} hours", stress.high_stress_hours());
    }

    println!("\n=== Recent Activities ===");
    for activity in client.get_recent_activities(5).await? {
        println!("- [{}] {}", activity.activity_type_key, activity.activity_name);
        println!("  Duration: {:.1} min", activity.duration_minutes());
        if activity.distance_meters > 0.0 {
            println!("  Distance: {:.2} km", activity.distance_km());
        }
        println!("  Calories: {:.0}", activity.calories);
    }

    println!("\n=== Hydration ===");
    if let Some(hydration) = client.get_hydration(yesterday).await? {
        println!("Water Intake: {:.0} ml", hydration.total_intake_ml);
        println!(
            "Goal: {:.0} ml ({:.0}%)",
            hydration.goal_ml,
            hydration.goal_percentage()
        );
    }

    println!("\n=== Weight ===");
    if let Some(weight) = client.get_latest_weight().await? {
        println!(
            "Latest Weight: {:.1} kg ({:.1} lbs)",
            weight.weight_kg(),
            weight.weight_lbs()
        );
    }

    println!("\n=== Health Snapshot ===");
    let snapshot = client.get_health_snapshot(yesterday).await?;
    println!("Date: {}", snapshot.date);
    println!("Domains with data: {}", snapshot.domains_with_data());
    if let Some(steps) = &snapshot.steps {
        println!("Steps: {} (Goal reached: {})", steps.total, steps.goal_reached);
    }

    println!("\n=== Weekly Health Report ===");
    let report = client.get_weekly_health_report().await?;
    println!("Period: {} to {}", report.period.start, report.period.end);
    if let Some(activities) = &report.activities {
        println!("Activities: {} workouts", activities.count);
        println!("Total Duration: {:.1} hours", activities.total_duration_hours);
        println!("Total Distance: {:.1} km", activities.total_distance_km);
    }
    println!("Avg Daily Steps: {:.0}", report.steps.avg_daily);
    println!("Days Goal Reached: {}/7", report.steps.days_goal_reached);
    println!("Avg Sleep: {:.1} hours", report.sleep.avg_hours);

    println!("\n=== Data Export ===");
    let start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    let export = client
        .export_data(start, today, ExportOptions::default())
        .await?;
    println!("Exported {} activities", export.activities.as_ref().map_or(0, Vec::len));
    println!("Exported {} sleep records", export.sleep.as_ref().map_or(0, Vec::len));
    println!(
        "Exported {} daily summaries",
        export.daily_summaries.as_ref().map_or(0, Vec::len)
    );

    Ok(())
}
