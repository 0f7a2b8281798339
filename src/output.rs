//! Output files
//!
//! File names carry the temperatures and the ramp bounds so that several
//! calibration programs can sit next to each other on a printer's storage.

use calikit_core::{round_float, Result};
use calikit_settings::{Calibration, Configuration};
use calikit_toolpath::{generate, GenerationSummary, WriterSink};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the program generated for `config`
///
/// `K3D_LA_H220-B60_0-0.1_d0.011.gcode` for a pressure advance tower,
/// `K3D_SMC_H220-B60_1000-5000_d1000.gcode` for an acceleration sawtooth.
pub fn output_file_name(config: &Configuration) -> String {
    let (start, end, step) = match &config.calibration {
        Calibration::PressureAdvance(pa) => {
            let step = step(pa.start_k_factor, pa.end_k_factor, pa.num_segments);
            (
                round_float(pa.start_k_factor, 2),
                round_float(pa.end_k_factor, 2),
                round_float(step, 3),
            )
        }
        Calibration::Acceleration(acc) => {
            let start = acc.start_acceleration as f64;
            let end = acc.end_acceleration as f64;
            (start, end, round_float(step(start, end, acc.num_segments), 0))
        }
    };
    format!(
        "K3D_{}_H{}-B{}_{}-{}_d{}.gcode",
        config.calibration.short_name(),
        config.filament.hotend_temperature,
        config.filament.bed_temperature,
        start,
        end,
        step
    )
}

fn step(start: f64, end: f64, segments: u32) -> f64 {
    if segments < 2 {
        return 0.0;
    }
    (end - start).abs() / (segments - 1) as f64
}

/// Where to write the program
///
/// A directory gets the generated file name appended; no path at all means
/// the generated file name in the working directory.
pub fn resolve_output_path(config: &Configuration, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(output_file_name(config)),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(output_file_name(config)),
    }
}

/// Generate the program for `config` into the file at `path`
pub fn write_program(config: &Configuration, path: &Path) -> Result<GenerationSummary> {
    let file = File::create(path)?;
    let mut sink = WriterSink::new(BufWriter::new(file));
    let summary = generate(config, &mut sink)?;
    info!(
        "Wrote {} lines to {} ({:.1} mm of filament)",
        summary.lines,
        path.display(),
        summary.filament_used
    );
    Ok(summary)
}
