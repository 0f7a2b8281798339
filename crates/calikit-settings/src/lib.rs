//! CaliKit Settings Crate
//!
//! Holds the configuration record of a calibration print, its defaults,
//! TOML/JSON persistence, and range validation.

pub mod config;
pub mod error;

pub use config::{
    sawtooth_width, AccelerationSettings, Calibration, Configuration, CustomGcode,
    FeedRateUnits, FilamentSettings, FirmwareDialect, FirstLayerSettings, Kinematics,
    MachineSettings, ModelSettings, PressureAdvanceSettings, PURGE_EDGE_MARGIN, RAFT_MARGIN,
    TOOTH_EDGE_LENGTH, TOWER_MODEL_WIDTH,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
