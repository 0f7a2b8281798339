//! # CaliKit
//!
//! G-code generator for 3D printer calibration prints:
//! - Pressure advance / linear advance tower (Marlin, Klipper, RepRapFirmware)
//! - Acceleration sawtooth
//!
//! ## Architecture
//!
//! CaliKit is organized as a workspace with multiple crates:
//!
//! 1. **calikit-core** - Points, rounding and number formatting, feed rate units
//! 2. **calikit-settings** - Configuration record, defaults, TOML/JSON files, validation
//! 3. **calikit-toolpath** - Motion state, extrusion, retraction, planners, program generators
//! 4. **calikit** - Command line binary, logging and output files

pub mod output;

pub use calikit_core::{Error, Point, Result};
pub use calikit_settings::{Calibration, Configuration, FirmwareDialect, Kinematics};
pub use calikit_toolpath::{generate, generate_lines, GcodeSink, GenerationSummary, WriterSink};
pub use output::{output_file_name, write_program};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so G-code written to stdout stays clean
/// - RUST_LOG environment variable support, `level` otherwise
/// - Pretty or JSON lines formatting
pub fn init_logging(json: bool, level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", level, e))?;

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
