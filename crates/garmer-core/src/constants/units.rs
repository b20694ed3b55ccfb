// ABOUTME: Unit conversion constants for distance, mass, volume, and time
// ABOUTME: Provides named constants to eliminate magic numbers in derived accessors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Garmer Contributors

/// Meters per kilometer conversion factor
pub const METERS_PER_KM: f64 = 1000.0;

/// Meters per statute mile
pub const METERS_PER_MILE: f64 = 1609.344;

/// Grams per kilogram
pub const GRAMS_PER_KG: f64 = 1000.0;

/// Pounds per kilogram
pub const LBS_PER_KG: f64 = 2.20462;

/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;

/// Milliliters per US fluid ounce
pub const ML_PER_FL_OZ: f64 = 29.5735;

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Seconds per minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Meters per second to kilometers per hour
pub const MPS_TO_KMH: f64 = 3.6;
