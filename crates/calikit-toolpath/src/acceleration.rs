//! Acceleration sawtooth
//!
//! Every layer prints all segments side by side: tooth `k` from the left is
//! printed with the `k`-th smallest acceleration, so each column of the
//! finished body shows the ringing of one acceleration value.

use crate::error::{ToolpathError, ToolpathResult};
use crate::firmware::ControlKind;
use crate::geometry::{
    bed_center, generate_zigzag_trajectory, plan_purge, plan_sawtooth_layer, purge_points,
    SawtoothParams,
};
use crate::program::ProgramWriter;
use crate::ramp::ParameterRamp;
use crate::sink::GcodeSink;
use crate::GenerationSummary;
use calikit_settings::{AccelerationSettings, Configuration, RAFT_MARGIN};
use tracing::{debug, info};

/// Number of layers, raft included, that fit below the model height
pub fn sawtooth_layer_count(model_height: f64, layer_height: f64) -> ToolpathResult<u32> {
    let layers = (model_height / layer_height + 1e-9).floor();
    if !layers.is_finite() || layers < 2.0 {
        return Err(ToolpathError::Geometry(format!(
            "model height {:.2} mm holds fewer than two layers of {:.2} mm",
            model_height, layer_height
        )));
    }
    Ok(layers as u32)
}

/// Acceleration ramp of a sawtooth configuration
pub fn acceleration_ramp(
    config: &Configuration,
    acc: &AccelerationSettings,
) -> ToolpathResult<ParameterRamp> {
    let layers = sawtooth_layer_count(acc.model_height, config.model.layer_height)?;
    ParameterRamp::new(
        acc.start_acceleration as f64,
        acc.end_acceleration as f64,
        acc.num_segments,
        layers - 1,
    )
}

/// Write a complete acceleration sawtooth program
pub fn generate_acceleration<S: GcodeSink + ?Sized>(
    config: &Configuration,
    acc: &AccelerationSettings,
    sink: &mut S,
) -> ToolpathResult<GenerationSummary> {
    let kind = ControlKind::Acceleration;
    let ramp = acceleration_ramp(config, acc)?;
    let total_layers = sawtooth_layer_count(acc.model_height, config.model.layer_height)?;
    let center = bed_center(config);
    let lh = config.model.layer_height;
    let first = &config.first_layer;
    let travel = config.machine.travel_speed;
    let params = SawtoothParams::new(config, acc, center);
    let raft_width = params.body_width() + RAFT_MARGIN;
    let slow = acc.slow_acceleration as f64;

    info!(
        "Generating acceleration sawtooth: {} teeth, {} layers, {} to {} mm/s2",
        acc.num_segments, total_layers, acc.start_acceleration, acc.end_acceleration
    );

    let bottom = ramp.printed(0).map(|s| s.value).unwrap_or(slow);

    let mut writer = ProgramWriter::new(config, sink);
    writer.header(kind, &ramp)?;
    writer.start_block()?;
    writer.control(ControlKind::PressureAdvance, acc.pressure_advance)?;
    writer.control(kind, bottom)?;
    writer.first_layer_height()?;

    // purge
    let purge = purge_points(
        center,
        config.machine.bed_x,
        raft_width / 2.0 + RAFT_MARGIN,
        first.line_width,
    );
    writer.emit_all(&plan_purge(
        writer.position(),
        &purge,
        first.line_width,
        first.print_speed,
        travel,
    ))?;

    // raft
    let raft = generate_zigzag_trajectory(center, first.line_width, raft_width)?;
    debug!(
        "Raft: {} points, line width {:.3} mm",
        raft.points.len(),
        raft.line_width
    );
    writer.retracted_travel(raft.points[0], travel)?;
    for point in &raft.points[1..] {
        writer.move_to(*point, raft.line_width, first.print_speed)?;
    }

    // sawtooth
    for layer in 1..total_layers {
        writer.layer_header(layer)?;
        let z = writer.position().z + lh;
        let plan = plan_sawtooth_layer(&params, z);
        if layer == 1 {
            writer.retracted_travel(plan.start, travel)?;
        } else {
            writer.move_to(plan.start, 0.0, travel)?;
        }

        for tooth in &plan.teeth {
            if let Some(segment) = ramp.printed(tooth.position) {
                writer.control(kind, segment.value)?;
            }
            writer.emit_all(&tooth.moves)?;
        }
        writer.control(kind, slow)?;
        writer.emit(&plan.down)?;
        writer.emit_all(&plan.lower_run)?;
        writer.emit(&plan.up)?;
    }

    writer.end_block()?;
    let (lines, state) = writer.finish()?;

    info!("Acceleration sawtooth done: {} lines", lines);
    Ok(GenerationSummary {
        calibration: config.calibration.short_name(),
        lines,
        layers: total_layers,
        segments: acc.num_segments,
        filament_used: state.extruder_position,
        final_z: state.position.z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_count() {
        assert_eq!(sawtooth_layer_count(10.0, 0.2).unwrap(), 50);
        assert_eq!(sawtooth_layer_count(1.0, 0.3).unwrap(), 3);
        assert!(sawtooth_layer_count(0.3, 0.2).is_err());
    }

    #[test]
    fn test_ramp_starts_with_lowest_acceleration() {
        let config = Configuration::acceleration_default();
        let Some(acc) = config.calibration.acceleration() else {
            panic!("acceleration defaults");
        };
        let ramp = acceleration_ramp(&config, acc).unwrap();
        let values: Vec<f64> = ramp.segments().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![5000.0, 4000.0, 3000.0, 2000.0, 1000.0]);
        assert_eq!(ramp.printed(0).map(|s| s.number), Some(1));
        assert_eq!(ramp.segments()[0].layers, 49);
    }
}
