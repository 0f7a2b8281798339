//! # CaliKit Toolpath
//!
//! Toolpath and G-code engine for printer calibration prints.
//!
//! ## Calibrations
//!
//! - **Pressure advance tower**: rectangular perimeters with slow short
//!   sections, K-factor ramped per segment of tower height
//! - **Acceleration sawtooth**: 90° teeth side by side, acceleration ramped
//!   per tooth
//!
//! ## Building blocks
//!
//! - **Extrusion**: filament length of a printed line
//! - **Motion**: position and extruder state, `G1` formatting
//! - **Retraction**: retract / deretract around travel moves
//! - **Ramp**: linear parameter ramp across segments
//! - **Firmware**: dialect specific control commands
//! - **Geometry**: purge line, zigzag raft, tower and sawtooth planners

pub mod acceleration;
pub mod error;
pub mod extrusion;
pub mod firmware;
pub mod geometry;
#[cfg(test)]
mod log_capture;
pub mod motion;
pub mod pressure_advance;
pub mod program;
pub mod ramp;
pub mod retraction;
pub mod sink;

pub use acceleration::generate_acceleration;
pub use error::{ToolpathError, ToolpathResult};
pub use extrusion::ExtrusionCalculator;
pub use firmware::{command, set_control_value, ControlKind, FirmwareAction};
pub use geometry::{generate_zigzag_trajectory, Move, ZigZagTrajectory};
pub use motion::{CommandEmitter, MotionState, RetractionState};
pub use pressure_advance::generate_pressure_advance;
pub use program::ProgramWriter;
pub use ramp::{linear_ramp, ParameterRamp, Segment};
pub use retraction::RetractionController;
pub use sink::{GcodeSink, WriterSink};

use calikit_settings::{Calibration, Configuration};
use serde::Serialize;

/// Version written into program headers
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of one generation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    /// Short calibration name, `LA` or `SMC`
    pub calibration: &'static str,
    /// Lines written to the sink
    pub lines: usize,
    /// Layers including the raft
    pub layers: u32,
    pub segments: u32,
    /// Final extruder position (mm of filament)
    pub filament_used: f64,
    /// Nozzle height after the end lift
    pub final_z: f64,
}

/// Generate the program for `config` into `sink`
///
/// The configuration is expected to be validated.
pub fn generate<S: GcodeSink + ?Sized>(
    config: &Configuration,
    sink: &mut S,
) -> ToolpathResult<GenerationSummary> {
    match &config.calibration {
        Calibration::PressureAdvance(pa) => generate_pressure_advance(config, pa, sink),
        Calibration::Acceleration(acc) => generate_acceleration(config, acc, sink),
    }
}

/// Generate the program for `config` as a list of lines
pub fn generate_lines(config: &Configuration) -> ToolpathResult<Vec<String>> {
    let mut lines = Vec::new();
    generate(config, &mut lines)?;
    Ok(lines)
}
