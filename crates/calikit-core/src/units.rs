//! Unit and number formatting utilities
//!
//! Speeds are configured in mm/s throughout CaliKit. G-code feed fields are
//! expressed in whatever unit the target firmware expects, so the conversion
//! lives here as an explicit function instead of a hidden `* 60` in the writer.
//!
//! Numeric fields are rounded half-away-from-zero on the scaled value before
//! they are printed with a fixed number of decimals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places for X, Y and Z fields
pub const AXIS_PRECISION: u32 = 2;

/// Decimal places for the extruder field
pub const EXTRUDER_PRECISION: u32 = 4;

/// Decimal places for calibration parameter fields
pub const PARAMETER_PRECISION: u32 = 3;

/// Feed rate units selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedRateUnits {
    /// Millimeters per minute (Marlin, Klipper and RepRapFirmware `F` words)
    #[default]
    MmPerMin,
    /// Millimeters per second
    MmPerSec,
}

impl fmt::Display for FeedRateUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MmPerMin => write!(f, "mm/min"),
            Self::MmPerSec => write!(f, "mm/sec"),
        }
    }
}

impl FromStr for FeedRateUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm/min" | "mm_per_min" | "mmpermin" => Ok(Self::MmPerMin),
            "mm/s" | "mm/sec" | "mm_per_sec" | "mmpersec" => Ok(Self::MmPerSec),
            _ => Err(format!("Unknown feed rate units: {}", s)),
        }
    }
}

/// Convert a speed in mm/s into the value of a G-code `F` field
///
/// * `speed_mm_per_sec` - Speed as configured by the user
/// * `units` - Unit the firmware expects for `F`
pub fn feed_rate_field(speed_mm_per_sec: u32, units: FeedRateUnits) -> u32 {
    match units {
        FeedRateUnits::MmPerMin => speed_mm_per_sec * 60,
        FeedRateUnits::MmPerSec => speed_mm_per_sec,
    }
}

/// Round `value` to `precision` decimal places, half away from zero
pub fn round_float(value: f64, precision: u32) -> f64 {
    let ratio = 10f64.powi(precision as i32);
    (value * ratio).round() / ratio
}

/// Round and print `value` with exactly `precision` decimals
///
/// Negative zero is printed as zero.
pub fn format_fixed(value: f64, precision: u32) -> String {
    let rounded = round_float(value, precision);
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", precision as usize, rounded)
}
