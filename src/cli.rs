//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calikit", version, about = "Calibration print G-code generator")]
pub struct Cli {
    /// Log as JSON lines instead of pretty
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace), RUST_LOG takes precedence
    #[arg(long = "log-level", global = true, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Calibration print to generate defaults for
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    /// Pressure advance tower
    PressureAdvance,
    /// Acceleration sawtooth
    Acceleration,
}

/// Configuration file format
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Format {
    Toml,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a calibration program from a configuration file
    Generate {
        /// Configuration file (.toml or .json)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
        /// Output file or directory; defaults to a generated name in the working directory
        #[arg(long, value_name = "PATH", conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Write the program to stdout
        #[arg(long, action = ArgAction::SetTrue)]
        stdout: bool,
    },
    /// Print a default configuration
    Defaults {
        /// Calibration print
        #[arg(long, value_enum, default_value = "pressure-advance")]
        mode: Mode,
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: Format,
    },
}
