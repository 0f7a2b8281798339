//! # CaliKit Core
//!
//! Core types and utilities shared by the CaliKit crates.
//! Provides the coordinate type, numeric rounding and formatting used by the
//! G-code writer, feed rate unit handling, and the unified error type.

pub mod data;
pub mod error;
pub mod units;

pub use data::Point;
pub use error::{Error, Result};
pub use units::{feed_rate_field, format_fixed, round_float, FeedRateUnits};
