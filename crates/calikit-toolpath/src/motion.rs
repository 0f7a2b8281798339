//! Motion state and the `G1` command writer
//!
//! [`MotionState`] is the single mutable record of a generation run. Every
//! move goes through [`CommandEmitter::emit_move`], which formats the
//! instruction from the previous state and then advances the state.

use crate::extrusion::ExtrusionCalculator;
use crate::geometry::Move;
use calikit_core::units::{AXIS_PRECISION, EXTRUDER_PRECISION};
use calikit_core::{feed_rate_field, format_fixed, round_float, FeedRateUnits, Point};
use tracing::warn;

/// Retraction state of the filament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetractionState {
    /// Filament is at the nozzle
    #[default]
    Deretracted,
    /// Filament has been pulled back
    Retracted,
}

/// Position, extruder and feed state of the printer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    /// Current nozzle position
    pub position: Point,
    /// Absolute extruder position, excluding any active retraction
    pub extruder_position: f64,
    /// Last commanded speed (mm/s)
    pub feed_rate: u32,
    /// Retraction state
    pub retraction: RetractionState,
}

impl MotionState {
    /// Create a state at `position` with a zeroed extruder
    pub fn new(position: Point, feed_rate: u32) -> Self {
        Self {
            position,
            extruder_position: 0.0,
            feed_rate,
            retraction: RetractionState::Deretracted,
        }
    }

    /// Whether the filament is currently retracted
    pub fn is_retracted(&self) -> bool {
        self.retraction == RetractionState::Retracted
    }
}

/// Turns moves into `G1` lines
#[derive(Debug, Clone, Copy)]
pub struct CommandEmitter {
    extrusion: ExtrusionCalculator,
    feed_rate_units: FeedRateUnits,
}

fn axis_changed(from: f64, to: f64) -> bool {
    round_float(from, AXIS_PRECISION) != round_float(to, AXIS_PRECISION)
}

impl CommandEmitter {
    pub fn new(extrusion: ExtrusionCalculator, feed_rate_units: FeedRateUnits) -> Self {
        Self {
            extrusion,
            feed_rate_units,
        }
    }

    /// Emit a move to `target` and update `state`
    ///
    /// Axes whose rounded value does not change are left out, the `E` word is
    /// present only when the move extrudes, and `F` is always present. The
    /// state always takes the exact target position.
    pub fn emit_move(
        &self,
        state: &mut MotionState,
        target: Point,
        width: f64,
        speed: u32,
    ) -> String {
        let start = state.position;
        let mut command = String::from("G1");

        if axis_changed(start.x, target.x) {
            command.push_str(&format!(" X{}", format_fixed(target.x, AXIS_PRECISION)));
        }
        if axis_changed(start.y, target.y) {
            command.push_str(&format!(" Y{}", format_fixed(target.y, AXIS_PRECISION)));
        }
        if axis_changed(start.z, target.z) {
            command.push_str(&format!(" Z{}", format_fixed(target.z, AXIS_PRECISION)));
        }

        let amount = self.extrusion.extrusion(&start, &target, width);
        if amount > 0.0 {
            if state.is_retracted() {
                warn!("Extruding move to {} while retracted", target);
            }
            state.extruder_position += amount;
            command.push_str(&format!(
                " E{}",
                format_fixed(state.extruder_position, EXTRUDER_PRECISION)
            ));
        }

        command.push_str(&format!(
            " F{}",
            feed_rate_field(speed, self.feed_rate_units)
        ));

        state.position = target;
        state.feed_rate = speed;
        command
    }

    /// Emit a planned [`Move`]
    pub fn emit(&self, state: &mut MotionState, mv: &Move) -> String {
        self.emit_move(state, mv.end, mv.width, mv.speed)
    }
}
