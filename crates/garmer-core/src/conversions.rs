// ABOUTME: Safe numeric conversions and shared arithmetic helpers for derived accessors
// ABOUTME: Clamps float-to-integer casts and defines goal percentages and means
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

/// Safely convert f64 to u64, clamping to valid range
/// Used for counters the API sometimes returns as floats (`142.0`)
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::missing_const_for_fn
)]
#[must_use]
pub fn f64_to_u64(value: f64) -> u64 {
    if value.is_nan() {
        return 0;
    }
    value.max(0.0).min(u64::MAX as f64) as u64
}

/// Safely convert f64 to u32, clamping to valid range
/// Used for heart rate, cadence, and goal values
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn
)]
#[must_use]
pub fn f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.max(0.0).min(f64::from(u32::MAX)) as u32
}

/// Safely convert f64 to i64, clamping to valid range
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_const_for_fn
)]
#[must_use]
pub fn f64_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    value.max(i64::MIN as f64).min(i64::MAX as f64) as i64
}

/// Clamp an i64 into the i32 range
#[must_use]
pub fn i64_to_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// `100 * actual / goal`, defined as exactly 0 when `goal` is not positive
#[must_use]
pub fn goal_percentage(actual: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        actual / goal * 100.0
    } else {
        0.0
    }
}

/// Arithmetic mean, `None` for an empty input
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_percentage_zero_goal() {
        assert!((goal_percentage(5000.0, 0.0) - 0.0).abs() < f64::EPSILON);
        assert!((goal_percentage(5000.0, 10_000.0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_empty_is_none() {
        assert!(mean(Vec::<f64>::new()).is_none());
        assert!((mean(vec![60.0, 62.0, 64.0]).unwrap() - 62.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamping_conversions() {
        assert_eq!(f64_to_u32(-5.0), 0);
        assert_eq!(f64_to_u32(142.7), 142);
        assert_eq!(f64_to_u64(f64::NAN), 0);
        assert_eq!(f64_to_i64(-3.9), -3);
        assert_eq!(i64_to_i32(i64::MAX), i32::MAX);
    }
}
