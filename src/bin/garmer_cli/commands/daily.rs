// ABOUTME: Daily summary, sleep, and health snapshot commands
// ABOUTME: Renders one day of data as text or JSON, defaulting to yesterday
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use std::process::ExitCode;

use chrono::NaiveDate;
use garmer::client::HealthSnapshot;
use garmer::config::GarmerConfig;
use garmer_core::conversions::goal_percentage;
use garmer_core::models::{DailySummary, SleepData, StressCategory};
use serde_json::{json, Value};

use super::connect;
use crate::helpers::dates::or_yesterday;
use crate::helpers::display::thousands;

const SECONDS_PER_HOUR: f64 = 3600.0;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

fn hours(seconds: u64) -> f64 {
    round_to(seconds as f64 / SECONDS_PER_HOUR, 2)
}

fn sleep_json(sleep: &SleepData) -> Value {
    json!({
        "total_hours": round_to(sleep.total_sleep_hours(), 2),
        "deep_hours": round_to(sleep.deep_sleep_hours(), 2),
        "light_hours": round_to(sleep.light_sleep_hours(), 2),
        "rem_hours": round_to(sleep.rem_sleep_hours(), 2),
        "awake_hours": round_to(sleep.awake_hours(), 2),
        "score": sleep.overall_score,
        "avg_hr": sleep.avg_sleep_heart_rate,
        "avg_hrv": sleep.avg_hrv,
    })
}

/// JSON layout of the summary command
pub fn summary_json(date: NaiveDate, summary: &DailySummary, sleep: Option<&SleepData>) -> Value {
    let mut data = json!({
        "date": date.to_string(),
        "steps": {
            "total": summary.total_steps,
            "goal": summary.daily_step_goal,
            "goal_percentage": round_to(summary.step_goal_percentage(), 1),
            "goal_reached": summary.total_steps >= u64::from(summary.daily_step_goal),
        },
        "distance_km": round_to(summary.total_distance_km(), 2),
        "calories": {
            "total": summary.total_kilocalories,
            "active": summary.active_kilocalories,
            "bmr": summary.bmr_kilocalories,
        },
        "floors": {
            "ascended": summary.floors_ascended,
            "descended": summary.floors_descended,
            "goal": summary.floors_ascended_goal,
        },
        "heart_rate": {
            "resting": summary.resting_heart_rate,
            "min": summary.min_heart_rate,
            "max": summary.max_heart_rate,
            "avg": summary.avg_heart_rate,
        },
        "stress": {
            "avg": summary.avg_stress_level,
            "max": summary.max_stress_level,
        },
        "body_battery": {
            "current": summary.body_battery_most_recent_value,
            "high": summary.body_battery_highest_value,
            "low": summary.body_battery_lowest_value,
            "charged": summary.body_battery_charged_value,
            "drained": summary.body_battery_drained_value,
            "net_change": summary.body_battery_net_change(),
        },
        "intensity_minutes": {
            "moderate": summary.moderate_intensity_minutes,
            "vigorous": summary.vigorous_intensity_minutes,
            "total": summary.total_intensity_minutes(),
            "goal": summary.intensity_minutes_goal,
        },
        "respiration": {
            "avg_waking": summary.avg_waking_respiration_value,
            "highest": summary.highest_respiration_value,
            "lowest": summary.lowest_respiration_value,
        },
        "spo2": {
            "avg": summary.avg_spo2_value,
            "lowest": summary.lowest_spo2_value,
            "latest": summary.latest_spo2_value,
        },
        "hrv_status": summary.hrv_status,
        "activity_time": {
            "highly_active_hours": hours(summary.highly_active_seconds),
            "active_hours": hours(summary.active_seconds),
            "sedentary_hours": hours(summary.sedentary_seconds),
        },
        "activities_count": summary.activities_count,
    });
    if let (Some(sleep), Value::Object(map)) = (sleep, &mut data) {
        map.insert("sleep".to_owned(), sleep_json(sleep));
    }
    data
}

fn print_summary(date: NaiveDate, summary: &DailySummary, sleep: Option<&SleepData>) {
    println!("\n=== Daily Summary for {date} ===\n");

    let step_percentage = summary.step_goal_percentage();
    let step_status = if step_percentage >= 100.0 {
        "achieved".to_owned()
    } else {
        format!("{step_percentage:.0}%")
    };
    println!(
        "Steps: {} / {} ({step_status})",
        thousands(summary.total_steps),
        thousands(u64::from(summary.daily_step_goal))
    );
    println!("Distance: {:.2} km", summary.total_distance_km());
    println!(
        "Calories: {} (Active: {}, BMR: {})",
        thousands(summary.total_kilocalories),
        thousands(summary.active_kilocalories),
        thousands(summary.bmr_kilocalories)
    );
    println!(
        "Floors: {:.0} / {} ({:.0}%)",
        summary.floors_ascended,
        summary.floors_ascended_goal,
        goal_percentage(summary.floors_ascended, f64::from(summary.floors_ascended_goal))
    );

    let mut heart_rate = Vec::new();
    if let Some(resting) = summary.resting_heart_rate {
        heart_rate.push(format!("Resting: {resting}"));
    }
    if let (Some(min), Some(max)) = (summary.min_heart_rate, summary.max_heart_rate) {
        heart_rate.push(format!("Range: {min}-{max}"));
    }
    if let Some(avg) = summary.avg_heart_rate {
        heart_rate.push(format!("Avg: {avg}"));
    }
    if !heart_rate.is_empty() {
        println!("Heart Rate: {} bpm", heart_rate.join(", "));
    }

    if let Some(avg) = summary.avg_stress_level.filter(|level| *level > 0) {
        let label = StressCategory::from_level(avg).as_str();
        match summary.max_stress_level {
            Some(max) => println!("Stress: {avg} avg ({label}), {max} max"),
            None => println!("Stress: {avg} avg ({label})"),
        }
    }

    if let Some(current) = summary.body_battery_most_recent_value {
        let mut parts = vec![format!("Current: {current}")];
        if let (Some(low), Some(high)) = (
            summary.body_battery_lowest_value,
            summary.body_battery_highest_value,
        ) {
            parts.push(format!("Range: {low}-{high}"));
        }
        if let Some(net) = summary.body_battery_net_change() {
            parts.push(format!("Net: {net:+}"));
        }
        println!("Body Battery: {}", parts.join(", "));
    }

    let total_intensity = summary.total_intensity_minutes();
    println!(
        "Intensity: {} moderate + {} vigorous = {total_intensity} total ({:.0}% of {} goal)",
        summary.moderate_intensity_minutes,
        summary.vigorous_intensity_minutes,
        goal_percentage(
            f64::from(total_intensity),
            f64::from(summary.intensity_minutes_goal)
        ),
        summary.intensity_minutes_goal
    );

    if let Some(respiration) = summary.avg_waking_respiration_value {
        println!("Respiration: {respiration:.1} breaths/min avg");
    }
    if let Some(avg) = summary.avg_spo2_value {
        match summary.lowest_spo2_value {
            Some(lowest) => println!("SpO2: {avg:.0}% avg, {lowest:.0}% lowest"),
            None => println!("SpO2: {avg:.0}% avg"),
        }
    }
    if let Some(status) = &summary.hrv_status {
        println!("HRV Status: {status}");
    }
    if summary.highly_active_seconds > 0 || summary.active_seconds > 0 {
        println!(
            "Activity: {} min highly active, {} min active, {:.1} hrs sedentary",
            summary.highly_active_seconds / 60,
            summary.active_seconds / 60,
            summary.sedentary_seconds as f64 / SECONDS_PER_HOUR
        );
    }
    if summary.activities_count > 0 {
        println!("Recorded Activities: {}", summary.activities_count);
    }

    if let Some(sleep) = sleep {
        println!("\n--- Last Night's Sleep ---");
        println!("Total: {:.1} hrs", sleep.total_sleep_hours());
        println!(
            "Stages: {:.1}h deep, {:.1}h light, {:.1}h REM",
            sleep.deep_sleep_hours(),
            sleep.light_sleep_hours(),
            sleep.rem_sleep_hours()
        );
        if let Some(score) = sleep.overall_score {
            println!("Score: {score}");
        }
        if let Some(hrv) = sleep.avg_hrv {
            println!("Avg HRV: {hrv:.0} ms");
        }
    }
}

/// Daily summary for one date
pub async fn summary(
    config: GarmerConfig,
    date: Option<NaiveDate>,
    json: bool,
    with_sleep: bool,
) -> anyhow::Result<ExitCode> {
    let client = connect(config).await?;
    let date = or_yesterday(date);

    let daily = client.get_daily_summary(date).await?;
    let sleep = if with_sleep {
        client.get_sleep(date).await?
    } else {
        None
    };

    let Some(daily) = daily else {
        if json {
            println!("{}", json!({"date": date.to_string(), "error": "No data available"}));
        }
        eprintln!("No data available for {date}");
        return Ok(ExitCode::FAILURE);
    };

    if json {
        let data = summary_json(date, &daily, sleep.as_ref());
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print_summary(date, &daily, sleep.as_ref());
    }
    Ok(ExitCode::SUCCESS)
}

/// Sleep for the night ending on one date
pub async fn sleep(config: GarmerConfig, date: Option<NaiveDate>) -> anyhow::Result<ExitCode> {
    let client = connect(config).await?;
    let date = or_yesterday(date);

    let Some(sleep) = client.get_sleep(date).await? else {
        eprintln!("No sleep data available for {date}");
        return Ok(ExitCode::FAILURE);
    };

    println!("\n=== Sleep Data for night ending {date} ===\n");
    println!("Total Sleep: {:.1} hours", sleep.total_sleep_hours());
    println!(
        "Deep Sleep: {:.1} hours ({:.1}%)",
        sleep.deep_sleep_hours(),
        sleep.deep_sleep_percentage()
    );
    println!("Light Sleep: {:.1} hours", sleep.light_sleep_hours());
    println!(
        "REM Sleep: {:.1} hours ({:.1}%)",
        sleep.rem_sleep_hours(),
        sleep.rem_sleep_percentage()
    );
    if let Some(score) = sleep.overall_score {
        println!("\nSleep Score: {score}");
    }
    if let Some(hr) = sleep.avg_sleep_heart_rate {
        println!("Avg HR: {hr} bpm");
    }
    if let Some(hrv) = sleep.avg_hrv {
        println!("Avg HRV: {hrv:.1} ms");
    }
    if let Some(efficiency) = sleep.sleep_efficiency() {
        println!("Sleep Efficiency: {efficiency:.1}%");
    }
    Ok(ExitCode::SUCCESS)
}

fn print_snapshot(snapshot: &HealthSnapshot) {
    println!("\n=== Health Snapshot for {} ===\n", snapshot.date);

    if let Some(steps) = &snapshot.steps {
        println!(
            "Steps: {} / {}{}",
            thousands(steps.total),
            thousands(u64::from(steps.goal)),
            if steps.goal_reached { " (goal reached)" } else { "" }
        );
    }
    if let Some(sleep) = &snapshot.sleep {
        println!("Sleep: {:.1} hrs", sleep.total_sleep_hours());
    }
    if let Some(resting) = snapshot.heart_rate.as_ref().and_then(|hr| hr.resting) {
        println!("Resting HR: {resting} bpm");
    }
    if let Some(avg) = snapshot.stress.as_ref().and_then(|stress| stress.avg_level) {
        println!(
            "Stress: {avg} avg ({})",
            StressCategory::from_level(avg).as_str()
        );
    }
    if let Some(hydration) = &snapshot.hydration {
        println!(
            "Hydration: {:.0} / {:.0} ml ({:.0}%)",
            hydration.intake_ml, hydration.goal_ml, hydration.goal_percentage
        );
    }
    if let Some(waking) = snapshot.respiration.as_ref().and_then(|resp| resp.avg_waking) {
        println!("Respiration: {waking:.1} breaths/min awake");
    }
    println!("\n{} of 7 domains with data", snapshot.domains_with_data());
}

/// Health snapshot for one date
pub async fn snapshot(
    config: GarmerConfig,
    date: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let client = connect(config).await?;
    let snapshot = client.get_health_snapshot(or_yesterday(date)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json_layout() {
        let summary = DailySummary {
            total_steps: 8000,
            daily_step_goal: 10_000,
            total_distance_meters: 6_123.0,
            active_seconds: 5400,
            ..DailySummary::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let data = summary_json(date, &summary, None);

        assert_eq!(data["date"], "2024-01-15");
        assert_eq!(data["steps"]["total"], 8000);
        assert_eq!(data["steps"]["goal_percentage"], 80.0);
        assert_eq!(data["steps"]["goal_reached"], false);
        assert_eq!(data["distance_km"], 6.12);
        assert_eq!(data["activity_time"]["active_hours"], 1.5);
        assert!(data["heart_rate"]["resting"].is_null());
        assert!(data.get("sleep").is_none());
    }

    #[test]
    fn test_summary_json_with_sleep() {
        let sleep = SleepData {
            total_sleep_seconds: 27_000,
            overall_score: Some(82),
            ..SleepData::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let data = summary_json(date, &DailySummary::default(), Some(&sleep));
        assert_eq!(data["sleep"]["total_hours"], 7.5);
        assert_eq!(data["sleep"]["score"], 82);
    }
}
