//! Pressure advance tower
//!
//! The tower is split into segments of equal height; each segment is printed
//! with its own K-factor, starting from the smallest one at the bottom.

use crate::error::{ToolpathError, ToolpathResult};
use crate::firmware::ControlKind;
use crate::geometry::{
    bed_center, generate_zigzag_trajectory, plan_purge, plan_tower_layer, purge_points,
    TowerParams,
};
use crate::program::ProgramWriter;
use crate::ramp::ParameterRamp;
use crate::sink::GcodeSink;
use crate::GenerationSummary;
use calikit_settings::{Configuration, PressureAdvanceSettings, RAFT_MARGIN, TOWER_MODEL_WIDTH};
use tracing::{debug, info};

/// Layers printed with the same K-factor
///
/// A small epsilon keeps exact multiples such as 3.0 / 0.2 from flooring to
/// one layer less.
pub fn layers_per_segment(segment_height: f64, layer_height: f64) -> ToolpathResult<u32> {
    let layers = (segment_height / layer_height + 1e-9).floor();
    if !layers.is_finite() || layers < 1.0 {
        return Err(ToolpathError::Geometry(format!(
            "segment height {:.2} mm holds no layer of {:.2} mm",
            segment_height, layer_height
        )));
    }
    Ok(layers as u32)
}

/// K-factor ramp of a tower configuration
pub fn pressure_advance_ramp(
    config: &Configuration,
    pa: &PressureAdvanceSettings,
) -> ToolpathResult<ParameterRamp> {
    let lps = layers_per_segment(pa.segment_height, config.model.layer_height)?;
    ParameterRamp::new(pa.start_k_factor, pa.end_k_factor, pa.num_segments, lps)
}

/// Write a complete pressure advance tower program
pub fn generate_pressure_advance<S: GcodeSink + ?Sized>(
    config: &Configuration,
    pa: &PressureAdvanceSettings,
    sink: &mut S,
) -> ToolpathResult<GenerationSummary> {
    let kind = ControlKind::PressureAdvance;
    let ramp = pressure_advance_ramp(config, pa)?;
    let lps = layers_per_segment(pa.segment_height, config.model.layer_height)?;
    let center = bed_center(config);
    let lh = config.model.layer_height;
    let first = &config.first_layer;
    let travel = config.machine.travel_speed;

    info!(
        "Generating pressure advance tower: {} segments of {} layers, K {} to {}",
        pa.num_segments, lps, pa.start_k_factor, pa.end_k_factor
    );

    let bottom = ramp.printed(0).map(|s| s.value).unwrap_or(0.0);

    let mut writer = ProgramWriter::new(config, sink);
    writer.header(kind, &ramp)?;
    writer.start_block()?;
    writer.control(kind, bottom)?;
    writer.first_layer_height()?;

    // purge
    let purge = purge_points(
        center,
        config.machine.bed_x,
        TOWER_MODEL_WIDTH + RAFT_MARGIN,
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
    let raft = generate_zigzag_trajectory(
        center,
        first.line_width,
        TOWER_MODEL_WIDTH + RAFT_MARGIN,
    )?;
    debug!(
        "Raft: {} points, line width {:.3} mm",
        raft.points.len(),
        raft.line_width
    );
    writer.retracted_travel(raft.points[0], travel)?;
    for point in &raft.points[1..] {
        writer.move_to(*point, raft.line_width, first.print_speed)?;
    }

    // tower
    let params = TowerParams::new(config, pa, center);
    let total_layers = pa.num_segments * lps;
    for layer in 1..total_layers {
        writer.layer_header(layer)?;
        let segment_start = layer % lps == 0;
        if segment_start {
            if let Some(segment) = ramp.printed((layer / lps) as usize) {
                debug!(
                    "Layer {}: segment {} with K-factor {}",
                    layer,
                    segment.number,
                    kind.format_value(segment.value)
                );
                writer.control(kind, segment.value)?;
            }
        }

        let z = writer.position().z + lh;
        let moves = plan_tower_layer(&params, writer.position(), z, segment_start);
        if let Some((entry, perimeters)) = moves.split_first() {
            if layer == 1 {
                writer.retracted_travel(entry.end, entry.speed)?;
            } else {
                writer.emit(entry)?;
            }
            writer.emit_all(perimeters)?;
        }
    }

    writer.end_block()?;
    let (lines, state) = writer.finish()?;

    info!("Pressure advance tower done: {} lines", lines);
    Ok(GenerationSummary {
        calibration: config.calibration.short_name(),
        lines,
        layers: total_layers,
        segments: pa.num_segments,
        filament_used: state.extruder_position,
        final_z: state.position.z,
    })
}
