// ABOUTME: Scriptable health queries for assistants and shell pipelines
// ABOUTME: Answers summary, sleep, activity, snapshot, insight, trend, and briefing requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors
//! Health queries over a saved session
//!
//! ```bash
//! cargo run --example health_query -- summary
//! cargo run --example health_query -- snapshot --date 2024-01-15
//! cargo run --example health_query -- insights --days 14
//! cargo run --example health_query -- briefing
//! ```

use std::collections::BTreeMap;
use std::process::ExitCode;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use garmer::client::{GarminClient, HealthSnapshot};
use garmer::config::GarmerConfig;
use garmer::extractors::{local_today, ActivityQuery};
use garmer::logging::init_from_config;
use garmer_core::models::{Activity, SleepData};
use serde::Serialize;

/// Weekly activity recommended by the WHO, in hours
const RECOMMENDED_WEEKLY_HOURS: f64 = 2.5;

/// Weekly activity considered well above the recommendation, in hours
const EXCELLENT_WEEKLY_HOURS: f64 = 5.0;

/// Lower bound of the recommended nightly sleep, in hours
const RECOMMENDED_SLEEP_HOURS: f64 = 7.0;

/// Deep sleep share below which sleep quality suffers, in percent
const MIN_DEEP_SLEEP_PERCENTAGE: f64 = 15.0;

#[derive(Parser)]
#[command(name = "health_query", about = "Query Garmin Connect health data")]
struct Args {
    #[command(subcommand)]
    query: Query,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short = 'd', global = true)]
    date: Option<NaiveDate>,

    /// Days to analyze for insights and trends
    #[arg(long, short = 'n', global = true, default_value = "7")]
    days: u32,
}

#[derive(Subcommand)]
enum Query {
    /// Daily health summary
    Summary,
    /// Sleep analysis
    Sleep,
    /// Recent activities
    Activities,
    /// Full health snapshot as JSON
    Snapshot,
    /// Activity breakdown and recommendations as JSON
    Insights,
    /// Sleep averages and recommendations as JSON
    SleepTrends,
    /// Markdown daily briefing
    Briefing,
}

#[derive(Debug, Default, Serialize)]
struct TypeTotals {
    count: usize,
    duration_hours: f64,
    distance_km: f64,
    calories: f64,
}

impl TypeTotals {
    fn add(&mut self, activity: &Activity) {
        self.count += 1;
        self.duration_hours += activity.duration_seconds / 3600.0;
        self.distance_km += activity.distance_km();
        self.calories += activity.calories;
    }
}

#[derive(Debug, Serialize)]
struct ActivityInsights {
    period_days: u32,
    total_activities: usize,
    activity_breakdown: BTreeMap<String, TypeTotals>,
    totals: TypeTotals,
    recommendations: Vec<&'static str>,
}

fn activity_insights(activities: &[Activity], days: u32) -> ActivityInsights {
    let mut breakdown: BTreeMap<String, TypeTotals> = BTreeMap::new();
    let mut totals = TypeTotals::default();
    for activity in activities {
        breakdown
            .entry(activity.activity_type_key.clone())
            .or_default()
            .add(activity);
        totals.add(activity);
    }

    let mut recommendations = Vec::new();
    if totals.duration_hours < RECOMMENDED_WEEKLY_HOURS {
        recommendations
            .push("Activity level is below WHO recommendation of 150+ minutes per week");
    } else if totals.duration_hours >= EXCELLENT_WEEKLY_HOURS {
        recommendations.push("Excellent activity level! Meeting or exceeding recommendations");
    }
    if breakdown.len() == 1 {
        recommendations.push("Consider adding variety to your workouts for better overall fitness");
    }
    if activities.is_empty() {
        recommendations
            .push("No activities recorded this period. Consider starting with light exercise");
    }

    ActivityInsights {
        period_days: days,
        total_activities: activities.len(),
        activity_breakdown: breakdown,
        totals,
        recommendations,
    }
}

#[derive(Debug, Serialize)]
struct SleepAverages {
    sleep_hours: f64,
    deep_sleep_hours: f64,
    rem_sleep_hours: f64,
    sleep_score: Option<f64>,
    sleep_hr: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SleepTrends {
    period_days: u32,
    days_with_data: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    averages: Option<SleepAverages>,
    trends: Vec<&'static str>,
    recommendations: Vec<&'static str>,
}

fn average<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then_some(sum / f64::from(count))
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn sleep_trends(nights: &[SleepData], days: u32) -> SleepTrends {
    let mut trends = SleepTrends {
        period_days: days,
        days_with_data: nights.len(),
        averages: None,
        trends: Vec::new(),
        recommendations: Vec::new(),
    };
    if nights.is_empty() {
        trends
            .recommendations
            .push("No sleep data available for analysis");
        return trends;
    }

    let hours = |seconds: fn(&SleepData) -> u64| {
        average(nights.iter().map(|night| seconds(night) as f64 / 3600.0)).unwrap_or(0.0)
    };
    let averages = SleepAverages {
        sleep_hours: round_to_tenth(hours(|night| night.total_sleep_seconds)),
        deep_sleep_hours: round_to_tenth(hours(|night| night.deep_sleep_seconds)),
        rem_sleep_hours: round_to_tenth(hours(|night| night.rem_sleep_seconds)),
        sleep_score: average(nights.iter().filter_map(|night| night.overall_score).map(f64::from))
            .map(f64::round),
        sleep_hr: average(
            nights
                .iter()
                .filter_map(|night| night.avg_sleep_heart_rate)
                .map(f64::from),
        )
        .map(f64::round),
    };

    if averages.sleep_hours < RECOMMENDED_SLEEP_HOURS {
        trends.trends.push("Average sleep is below recommended 7-9 hours");
        trends
            .recommendations
            .push("Try to increase sleep duration by going to bed 30 minutes earlier");
    }
    let total: u64 = nights
        .iter()
        .map(|night| night.total_sleep_seconds)
        .fold(0, u64::saturating_add);
    let deep: u64 = nights
        .iter()
        .map(|night| night.deep_sleep_seconds)
        .fold(0, u64::saturating_add);
    let deep_percentage = if total > 0 {
        deep as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    if deep_percentage < MIN_DEEP_SLEEP_PERCENTAGE {
        trends.trends.push("Deep sleep percentage is below optimal");
        trends
            .recommendations
            .push("Avoid alcohol and heavy meals close to bedtime to improve deep sleep");
    }

    trends.averages = Some(averages);
    trends
}

fn daily_briefing(snapshot: &HealthSnapshot) -> String {
    let mut lines = vec![format!("# Daily Health Briefing - {}\n", snapshot.date)];

    if let Some(steps) = &snapshot.steps {
        let percentage = if steps.goal > 0 {
            steps.total as f64 / f64::from(steps.goal) * 100.0
        } else {
            0.0
        };
        lines.push(format!(
            "**Steps:** {} / {} ({percentage:.0}%)",
            steps.total, steps.goal
        ));
    }
    if let Some(sleep) = &snapshot.sleep {
        let score = sleep
            .overall_score
            .map_or_else(|| "N/A".to_owned(), |score| score.to_string());
        lines.push(format!(
            "**Sleep:** {:.1} hours (Score: {score})",
            sleep.total_sleep_hours()
        ));
    }
    if let Some(heart_rate) = &snapshot.heart_rate {
        let resting = heart_rate
            .resting
            .map_or_else(|| "N/A".to_owned(), |resting| resting.to_string());
        lines.push(format!("**Resting HR:** {resting} bpm"));
    }
    if let Some(stress) = &snapshot.stress {
        let level = stress
            .avg_level
            .map_or_else(|| "N/A".to_owned(), |level| level.to_string());
        lines.push(format!("**Avg Stress:** {level}"));
    }
    if let Some(hydration) = &snapshot.hydration {
        lines.push(format!(
            "**Hydration:** {:.0}% of goal",
            hydration.goal_percentage
        ));
    }

    lines.join("\n")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(client: &GarminClient, query: Query, date: NaiveDate, days: u32) -> Result<()> {
    let window_start = date
        .checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
        .unwrap_or(date);

    match query {
        Query::Summary => {
            let Some(summary) = client.get_daily_summary(date).await? else {
                println!("No data available for {date}");
                return Ok(());
            };
            println!("Date: {date}");
            println!("Steps: {} / {}", summary.total_steps, summary.daily_step_goal);
            println!("Distance: {:.2} km", summary.total_distance_km());
            println!("Calories: {}", summary.total_kilocalories);
            if let Some(resting) = summary.resting_heart_rate {
                println!("Resting HR: {resting} bpm");
            }
            if let Some(stress) = summary.avg_stress_level {
                println!("Avg Stress: {stress}");
            }
        }
        Query::Sleep => {
            let Some(sleep) = client.get_sleep(date).await? else {
                println!("No sleep data available");
                return Ok(());
            };
            println!("Total Sleep: {:.1} hours", sleep.total_sleep_hours());
            println!("Deep Sleep: {:.1} hours", sleep.deep_sleep_hours());
            println!("REM Sleep: {:.1} hours", sleep.rem_sleep_hours());
            if let Some(score) = sleep.overall_score {
                println!("Sleep Score: {score}");
            }
            if let Some(hrv) = sleep.avg_hrv {
                println!("HRV: {hrv:.1} ms");
            }
        }
        Query::Activities => {
            let activities = client.get_recent_activities(5).await?;
            if activities.is_empty() {
                println!("No recent activities");
            }
            for activity in activities {
                println!("- {} ({})", activity.activity_name, activity.activity_type_key);
                println!(
                    "  Duration: {:.0} min, Distance: {:.2} km",
                    activity.duration_minutes(),
                    activity.distance_km()
                );
            }
        }
        Query::Snapshot => print_json(&client.get_health_snapshot(date).await?)?,
        Query::Insights => {
            let query = ActivityQuery::between(window_start, date).limit(100);
            let activities = client.get_activities(&query).await?;
            print_json(&activity_insights(&activities, days))?;
        }
        Query::SleepTrends => {
            let nights = client.get_sleep_range(window_start, date).await?;
            print_json(&sleep_trends(&nights, days))?;
        }
        Query::Briefing => {
            let snapshot = client.get_health_snapshot(date).await?;
            println!("{}", daily_briefing(&snapshot));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = GarmerConfig::load();
    init_from_config(&config, false)?;

    let Ok(client) = GarminClient::from_saved_tokens(config).await else {
        eprintln!("Error: Not authenticated. Run 'garmer login' first.");
        return Ok(ExitCode::FAILURE);
    };

    let date = args.date.unwrap_or_else(local_today);
    run(&client, args.query, date, args.days).await?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(type_key: &str, minutes: f64, meters: f64) -> Activity {
        Activity {
            activity_type_key: type_key.to_owned(),
            duration_seconds: minutes * 60.0,
            distance_meters: meters,
            calories: 100.0,
            ..Activity::default()
        }
    }

    fn night(total_hours: u64, deep_hours: u64, score: Option<u32>) -> SleepData {
        SleepData {
            total_sleep_seconds: total_hours * 3600,
            deep_sleep_seconds: deep_hours * 3600,
            overall_score: score,
            ..SleepData::default()
        }
    }

    #[test]
    fn test_insights_group_by_type() {
        let activities = [
            activity("running", 60.0, 10_000.0),
            activity("running", 90.0, 15_000.0),
            activity("cycling", 180.0, 60_000.0),
        ];
        let insights = activity_insights(&activities, 7);

        assert_eq!(insights.total_activities, 3);
        assert_eq!(insights.activity_breakdown["running"].count, 2);
        assert!((insights.activity_breakdown["running"].distance_km - 25.0).abs() < 1e-9);
        assert!((insights.totals.duration_hours - 5.5).abs() < 1e-9);
        assert_eq!(
            insights.recommendations,
            vec!["Excellent activity level! Meeting or exceeding recommendations"]
        );
    }

    #[test]
    fn test_insights_without_activities() {
        let insights = activity_insights(&[], 7);
        assert_eq!(insights.recommendations.len(), 2);
        assert!(insights.recommendations[1].starts_with("No activities recorded"));
    }

    #[test]
    fn test_sleep_trends_flag_short_and_shallow_sleep() {
        let nights = [night(6, 0, Some(70)), night(7, 1, Some(80)), night(6, 0, None)];
        let trends = sleep_trends(&nights, 7);

        let averages = trends.averages.as_ref().unwrap();
        assert!((averages.sleep_hours - 6.3).abs() < 1e-9);
        assert_eq!(averages.sleep_score, Some(75.0));
        assert!(averages.sleep_hr.is_none());
        assert_eq!(trends.trends.len(), 2);
        assert_eq!(trends.recommendations.len(), 2);
    }

    #[test]
    fn test_sleep_trends_without_nights() {
        let value = serde_json::to_value(sleep_trends(&[], 7)).unwrap();
        assert_eq!(value["days_with_data"], 0);
        assert!(value.get("averages").is_none());
        assert_eq!(value["recommendations"], json!(["No sleep data available for analysis"]));
    }

    #[test]
    fn test_briefing_lists_available_domains() {
        let snapshot = HealthSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            daily_summary: None,
            sleep: Some(night(8, 2, Some(85))),
            heart_rate: None,
            stress: None,
            steps: None,
            hydration: None,
            respiration: None,
        };
        let briefing = daily_briefing(&snapshot);

        assert!(briefing.starts_with("# Daily Health Briefing - 2024-01-15"));
        assert!(briefing.contains("**Sleep:** 8.0 hours (Score: 85)"));
        assert!(!briefing.contains("Steps"));
    }
}
