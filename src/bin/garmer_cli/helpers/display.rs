// ABOUTME: Human-readable formatting for CLI output
// ABOUTME: Number grouping, pace and duration strings, and activity printers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

use garmer_core::conversions::f64_to_u64;
use garmer_core::models::{Activity, HeartRateZone, Lap};
use serde_json::{json, Value};

/// Group digits in threes: `12345` becomes `12,345`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Minutes per kilometer as `m:ss`
pub fn pace(minutes_per_km: f64) -> String {
    let total_seconds = f64_to_u64((minutes_per_km * 60.0).round());
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Seconds as `1h 05m` or `42m 10s`
pub fn duration(seconds: f64) -> String {
    let total = f64_to_u64(seconds.round());
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else {
        format!("{minutes}m {secs:02}s")
    }
}

fn start_label(activity: &Activity) -> String {
    activity
        .start_time
        .map_or_else(|| "unknown time".to_owned(), |start| start.format("%Y-%m-%d %H:%M").to_string())
}

/// One-line activity listing
pub fn print_activity_brief(activity: &Activity) {
    let mut line = format!(
        "{}  {}  [{}]  {}",
        start_label(activity),
        activity.activity_name,
        activity.activity_type_key,
        duration(activity.duration_seconds)
    );
    if activity.distance_meters > 0.0 {
        line.push_str(&format!("  {:.2} km", activity.distance_km()));
    }
    if let Some(minutes) = activity.pace_per_km() {
        line.push_str(&format!("  {} /km", pace(minutes)));
    }
    println!("{line}  (id {})", activity.activity_id);
}

/// Multi-line activity details, with optional laps and zones
pub fn print_activity_detailed(activity: &Activity, laps: &[Lap], zones: &[HeartRateZone]) {
    println!("{} ({})", activity.activity_name, activity.activity_type_key);
    println!("  ID:        {}", activity.activity_id);
    println!("  Start:     {}", start_label(activity));
    println!("  Duration:  {}", duration(activity.duration_seconds));
    if activity.distance_meters > 0.0 {
        println!("  Distance:  {:.2} km", activity.distance_km());
    }
    if let Some(minutes) = activity.pace_per_km() {
        println!("  Pace:      {} /km", pace(minutes));
    }
    if let Some(speed) = activity.avg_speed_kmh() {
        println!("  Speed:     {speed:.1} km/h");
    }
    println!("  Calories:  {}", thousands(f64_to_u64(activity.calories)));
    if let Some(avg) = activity.avg_heart_rate {
        let max = activity
            .max_heart_rate
            .map_or_else(String::new, |max| format!(" (max {max})"));
        println!("  Heart rate: {avg} bpm{max}");
    }
    if let Some(gain) = activity.elevation_gain {
        println!("  Elevation: +{gain:.0} m");
    }
    if let Some(effect) = activity.aerobic_training_effect {
        println!("  Training effect: {effect:.1}");
    }

    if !laps.is_empty() {
        println!();
        println!("Laps:");
        for lap in laps {
            println!(
                "  {:>3}  {:>8}  {:>6.2} km{}",
                lap.lap_number,
                duration(lap.duration_seconds),
                lap.distance_km(),
                lap.avg_heart_rate
                    .map_or_else(String::new, |hr| format!("  {hr} bpm"))
            );
        }
    }

    if !zones.is_empty() {
        println!();
        println!("Heart rate zones:");
        for zone in zones {
            println!(
                "  Zone {} {:<12} {:>3}-{:<3} bpm  {:>6.1} min",
                zone.zone_number,
                zone.zone_name,
                zone.min_hr,
                zone.max_hr,
                zone.time_in_zone_minutes()
            );
        }
    }
}

/// JSON view of an activity with derived fields and optional laps and zones
pub fn activity_json(
    activity: &Activity,
    laps: Option<&[Lap]>,
    zones: Option<&[HeartRateZone]>,
) -> Value {
    let mut value = json!({
        "activity_id": activity.activity_id,
        "name": activity.activity_name,
        "type": activity.activity_type_key,
        "start_time": activity.start_time,
        "duration_minutes": activity.duration_minutes(),
        "distance_km": activity.distance_km(),
        "pace_per_km": activity.pace_per_km(),
        "avg_speed_kmh": activity.avg_speed_kmh(),
        "calories": activity.calories,
        "avg_heart_rate": activity.avg_heart_rate,
        "max_heart_rate": activity.max_heart_rate,
        "elevation_gain": activity.elevation_gain,
        "aerobic_training_effect": activity.aerobic_training_effect,
    });
    if let Value::Object(map) = &mut value {
        if let Some(laps) = laps {
            map.insert("laps".to_owned(), json!(laps));
        }
        if let Some(zones) = zones {
            map.insert("hr_zones".to_owned(), json!(zones));
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(12_345), "12,345");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_pace() {
        assert_eq!(pace(5.5), "5:30");
        assert_eq!(pace(4.0), "4:00");
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(3900.0), "1h 05m");
        assert_eq!(duration(2530.0), "42m 10s");
    }

    #[test]
    fn test_activity_json_includes_requested_sections() {
        let activity = Activity {
            activity_id: 7,
            ..Activity::default()
        };
        let value = activity_json(&activity, Some(&[]), None);
        assert_eq!(value["activity_id"], 7);
        assert!(value.get("laps").is_some());
        assert!(value.get("hr_zones").is_none());
    }
}
