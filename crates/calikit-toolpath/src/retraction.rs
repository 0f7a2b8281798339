//! Retraction around travel moves
//!
//! A retraction pulls the filament back by a fixed length without touching
//! the tracked extruder position; the matching deretraction pushes it back to
//! that position. Calling either one twice in a row is a planner ordering
//! bug: nothing is emitted and a warning is logged.

use crate::motion::{MotionState, RetractionState};
use calikit_core::units::EXTRUDER_PRECISION;
use calikit_core::{feed_rate_field, format_fixed, FeedRateUnits};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetractionController {
    length: f64,
    speed: u32,
    feed_rate_units: FeedRateUnits,
}

impl RetractionController {
    pub fn new(length: f64, speed: u32, feed_rate_units: FeedRateUnits) -> Self {
        Self {
            length,
            speed,
            feed_rate_units,
        }
    }

    /// Pull the filament back
    ///
    /// Returns `None` when the filament is already retracted.
    pub fn retract(&self, state: &mut MotionState) -> Option<String> {
        if state.is_retracted() {
            warn!("Called retraction, but already retracted");
            return None;
        }
        state.retraction = RetractionState::Retracted;
        state.feed_rate = self.speed;
        Some(format!(
            "G1 E{} F{}",
            format_fixed(state.extruder_position - self.length, EXTRUDER_PRECISION),
            feed_rate_field(self.speed, self.feed_rate_units)
        ))
    }

    /// Push the filament back to the tracked extruder position
    ///
    /// Returns `None` when the filament is not retracted.
    pub fn deretract(&self, state: &mut MotionState) -> Option<String> {
        if !state.is_retracted() {
            warn!("Called deretraction, but not retracted");
            return None;
        }
        state.retraction = RetractionState::Deretracted;
        state.feed_rate = self.speed;
        Some(format!(
            "G1 E{} F{}",
            format_fixed(state.extruder_position, EXTRUDER_PRECISION),
            feed_rate_field(self.speed, self.feed_rate_units)
        ))
    }
}
