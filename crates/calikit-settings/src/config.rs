//! Calibration print configuration for CaliKit
//!
//! Provides the configuration record consumed by the toolpath engine, file
//! handling, and validation. Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Machine settings (bed size, kinematics, firmware, travel speed)
//! - Filament settings (temperatures, cooling, flow, retraction)
//! - First layer settings (raft line width, speed, Z offset)
//! - Model settings (line width, layer height)
//! - Calibration settings (pressure advance tower or acceleration sawtooth)
//! - Custom start/end G-code

pub use calikit_core::units::FeedRateUnits;
use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Side length of the pressure advance tower footprint (mm)
pub const TOWER_MODEL_WIDTH: f64 = 40.0;

/// Extra raft width around the calibration body (mm)
pub const RAFT_MARGIN: f64 = 10.0;

/// Edge length of one sawtooth tooth (mm)
pub const TOOTH_EDGE_LENGTH: f64 = 20.0;

/// Distance kept between the purge line ends and the bed edge (mm)
pub const PURGE_EDGE_MARGIN: f64 = 15.0;

/// Printer kinematics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kinematics {
    /// Origin in the bed corner
    #[default]
    Cartesian,
    /// Origin in the bed center
    Delta,
}

impl std::fmt::Display for Kinematics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cartesian => write!(f, "cartesian"),
            Self::Delta => write!(f, "delta"),
        }
    }
}

/// Firmware family running on the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FirmwareDialect {
    /// Marlin
    #[default]
    Marlin,
    /// Klipper
    Klipper,
    /// RepRapFirmware (Duet)
    RepRapFirmware,
    /// Anything else
    Unknown,
}

impl From<String> for FirmwareDialect {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "marlin" => Self::Marlin,
            "klipper" => Self::Klipper,
            "reprapfirmware" | "reprap" | "rrf" => Self::RepRapFirmware,
            "unknown" => Self::Unknown,
            other => {
                warn!("Unknown firmware '{}', control commands become comments", other);
                Self::Unknown
            }
        }
    }
}

impl From<FirmwareDialect> for String {
    fn from(value: FirmwareDialect) -> Self {
        match value {
            FirmwareDialect::Marlin => "marlin",
            FirmwareDialect::Klipper => "klipper",
            FirmwareDialect::RepRapFirmware => "reprapfirmware",
            FirmwareDialect::Unknown => "unknown",
        }
        .to_string()
    }
}

impl std::fmt::Display for FirmwareDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Marlin => write!(f, "Marlin"),
            Self::Klipper => write!(f, "Klipper"),
            Self::RepRapFirmware => write!(f, "RepRapFirmware"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Machine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Bed size along X, or bed diameter for delta printers (mm)
    pub bed_x: f64,
    /// Bed size along Y, or bed diameter for delta printers (mm)
    pub bed_y: f64,
    /// Printer kinematics
    pub kinematics: Kinematics,
    /// Probe the bed before printing
    pub bed_probe: bool,
    /// Firmware dialect
    pub firmware: FirmwareDialect,
    /// Travel speed (mm/s)
    pub travel_speed: u32,
    /// Unit of the `F` word expected by the firmware
    pub feed_rate_units: FeedRateUnits,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            bed_x: 220.0,
            bed_y: 220.0,
            kinematics: Kinematics::Cartesian,
            bed_probe: false,
            firmware: FirmwareDialect::Marlin,
            travel_speed: 150,
            feed_rate_units: FeedRateUnits::MmPerMin,
        }
    }
}

/// Filament settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilamentSettings {
    /// Hotend temperature (°C)
    pub hotend_temperature: u32,
    /// Bed temperature (°C)
    pub bed_temperature: u32,
    /// Part cooling fan speed (%)
    pub cooling: u32,
    /// Flow multiplier (%)
    pub flow: u32,
    /// Retraction distance (mm)
    pub retract_length: f64,
    /// Retraction speed (mm/s)
    pub retract_speed: u32,
}

impl FilamentSettings {
    /// Fan speed on the 0-255 PWM scale
    pub fn fan_pwm(&self) -> u32 {
        (self.cooling as f64 * 255.0 / 100.0).round() as u32
    }
}

impl Default for FilamentSettings {
    fn default() -> Self {
        Self {
            hotend_temperature: 220,
            bed_temperature: 60,
            cooling: 100,
            flow: 100,
            retract_length: 1.0,
            retract_speed: 35,
        }
    }
}

/// First layer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstLayerSettings {
    /// Line width of the purge line and raft (mm)
    pub line_width: f64,
    /// Print speed of the purge line and raft (mm/s)
    pub print_speed: u32,
    /// Offset added to the first layer height (mm)
    pub z_offset: f64,
}

impl Default for FirstLayerSettings {
    fn default() -> Self {
        Self {
            line_width: 0.5,
            print_speed: 30,
            z_offset: 0.0,
        }
    }
}

/// Model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Line width of the calibration body (mm)
    pub line_width: f64,
    /// Layer height (mm)
    pub layer_height: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            line_width: 0.4,
            layer_height: 0.2,
        }
    }
}

/// Pressure advance tower settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureAdvanceSettings {
    /// Perimeters per layer
    pub num_perimeters: u32,
    /// Speed of the long wall sections (mm/s)
    pub fast_print_speed: u32,
    /// Speed of the short wall sections (mm/s)
    pub slow_print_speed: u32,
    /// First K-factor of the sweep
    pub start_k_factor: f64,
    /// Last K-factor of the sweep
    pub end_k_factor: f64,
    /// Number of segments
    pub num_segments: u32,
    /// Height of one segment (mm)
    pub segment_height: f64,
}

impl Default for PressureAdvanceSettings {
    fn default() -> Self {
        Self {
            num_perimeters: 2,
            fast_print_speed: 100,
            slow_print_speed: 20,
            start_k_factor: 0.0,
            end_k_factor: 0.1,
            num_segments: 10,
            segment_height: 3.0,
        }
    }
}

/// Acceleration sawtooth settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationSettings {
    /// Print speed of the whole body (mm/s)
    pub print_speed: u32,
    /// Acceleration of the return run (mm/s²)
    pub slow_acceleration: u32,
    /// First acceleration of the sweep (mm/s²)
    pub start_acceleration: u32,
    /// Last acceleration of the sweep (mm/s²)
    pub end_acceleration: u32,
    /// Number of teeth, one per segment
    pub num_segments: u32,
    /// Pressure advance value used for the whole print
    pub pressure_advance: f64,
    /// Height of the body (mm)
    pub model_height: f64,
}

impl Default for AccelerationSettings {
    fn default() -> Self {
        Self {
            print_speed: 100,
            slow_acceleration: 1000,
            start_acceleration: 1000,
            end_acceleration: 5000,
            num_segments: 5,
            pressure_advance: 0.0,
            model_height: 10.0,
        }
    }
}

/// Which parameter the print calibrates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Calibration {
    /// Ramped pressure advance on a rectangular tower
    PressureAdvance(PressureAdvanceSettings),
    /// Ramped acceleration on a sawtooth body
    Acceleration(AccelerationSettings),
}

impl Calibration {
    pub fn pressure_advance(&self) -> Option<&PressureAdvanceSettings> {
        match self {
            Self::PressureAdvance(pa) => Some(pa),
            Self::Acceleration(_) => None,
        }
    }

    pub fn acceleration(&self) -> Option<&AccelerationSettings> {
        match self {
            Self::Acceleration(acc) => Some(acc),
            Self::PressureAdvance(_) => None,
        }
    }

    /// Side length of the square raft under the body (mm)
    pub fn raft_width(&self) -> f64 {
        match self {
            Self::PressureAdvance(_) => TOWER_MODEL_WIDTH + RAFT_MARGIN,
            Self::Acceleration(acc) => sawtooth_width(acc.num_segments) + RAFT_MARGIN,
        }
    }

    /// Short name used in logs and file names
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::PressureAdvance(_) => "LA",
            Self::Acceleration(_) => "SMC",
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::PressureAdvance(PressureAdvanceSettings::default())
    }
}

/// Overall width of a sawtooth body with `num_segments` teeth (mm)
pub fn sawtooth_width(num_segments: u32) -> f64 {
    num_segments as f64 * TOOTH_EDGE_LENGTH * std::f64::consts::SQRT_2
}

/// User supplied start and end G-code
///
/// The start block understands `$BEDTEMP`, `$HOTTEMP`, `$G28`, `$G29` and `$FLOW`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomGcode {
    /// Executed before the purge line
    pub start: String,
    /// Executed after the final lift
    pub end: String,
}

impl Default for CustomGcode {
    fn default() -> Self {
        Self {
            start: [
                "M104 S150",
                "M190 S$BEDTEMP",
                "M109 S$HOTTEMP",
                "$G28",
                "$G29",
                "G92 E0",
                "G90",
                "M82",
                "M106 S0",
                "M221 S$FLOW",
            ]
            .join("\n"),
            end: ["M104 S0", "M140 S0", "M106 S0", "M84"].join("\n"),
        }
    }
}

/// Complete, validated input of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Configuration {
    /// Machine settings
    pub machine: MachineSettings,
    /// Filament settings
    pub filament: FilamentSettings,
    /// First layer settings
    pub first_layer: FirstLayerSettings,
    /// Model settings
    pub model: ModelSettings,
    /// Calibration settings
    pub calibration: Calibration,
    /// Custom G-code blocks
    pub gcode: CustomGcode,
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value,
            min,
            max,
        })
    }
}

impl Configuration {
    /// Defaults of the pressure advance tower
    pub fn pressure_advance_default() -> Self {
        Self::default()
    }

    /// Defaults of the acceleration sawtooth
    pub fn acceleration_default() -> Self {
        Self {
            calibration: Calibration::Acceleration(AccelerationSettings::default()),
            ..Self::default()
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        config.validate()?;
        debug!("Loaded {} configuration from {}", config.calibration.short_name(), path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty TOML document
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let m = &self.machine;
        check_range("machine.bed_x", m.bed_x, 100.0, 1000.0)?;
        check_range("machine.bed_y", m.bed_y, 100.0, 1000.0)?;
        check_range("machine.travel_speed", m.travel_speed as f64, 10.0, 1000.0)?;

        let f = &self.filament;
        check_range(
            "filament.hotend_temperature",
            f.hotend_temperature as f64,
            150.0,
            350.0,
        )?;
        check_range("filament.bed_temperature", f.bed_temperature as f64, 0.0, 150.0)?;
        check_range("filament.cooling", f.cooling as f64, 0.0, 100.0)?;
        check_range("filament.flow", f.flow as f64, 50.0, 150.0)?;
        check_range("filament.retract_length", f.retract_length, 0.1, 20.0)?;
        check_range("filament.retract_speed", f.retract_speed as f64, 5.0, 150.0)?;

        let fl = &self.first_layer;
        check_range("first_layer.line_width", fl.line_width, 0.1, 2.0)?;
        check_range("first_layer.print_speed", fl.print_speed as f64, 10.0, 1000.0)?;
        check_range("first_layer.z_offset", fl.z_offset, -0.5, 0.5)?;

        let md = &self.model;
        check_range("model.line_width", md.line_width, 0.1, 2.0)?;
        check_range("model.layer_height", md.layer_height, 0.05, 1.2)?;

        match &self.calibration {
            Calibration::PressureAdvance(pa) => {
                check_range(
                    "calibration.num_perimeters",
                    pa.num_perimeters as f64,
                    1.0,
                    5.0,
                )?;
                check_range(
                    "calibration.fast_print_speed",
                    pa.fast_print_speed as f64,
                    10.0,
                    1000.0,
                )?;
                check_range(
                    "calibration.slow_print_speed",
                    pa.slow_print_speed as f64,
                    10.0,
                    1000.0,
                )?;
                check_range("calibration.start_k_factor", pa.start_k_factor, 0.0, 2.0)?;
                check_range("calibration.end_k_factor", pa.end_k_factor, 0.0, 2.0)?;
                check_range("calibration.num_segments", pa.num_segments as f64, 2.0, 100.0)?;
                check_range("calibration.segment_height", pa.segment_height, 0.5, 10.0)?;
                if pa.segment_height < md.layer_height {
                    return Err(ConfigError::InvalidValue {
                        key: "calibration.segment_height".to_string(),
                        reason: "must not be less than the layer height".to_string(),
                    });
                }
            }
            Calibration::Acceleration(acc) => {
                check_range("calibration.print_speed", acc.print_speed as f64, 60.0, 600.0)?;
                check_range(
                    "calibration.slow_acceleration",
                    acc.slow_acceleration as f64,
                    100.0,
                    50000.0,
                )?;
                check_range(
                    "calibration.start_acceleration",
                    acc.start_acceleration as f64,
                    100.0,
                    50000.0,
                )?;
                check_range(
                    "calibration.end_acceleration",
                    acc.end_acceleration as f64,
                    100.0,
                    50000.0,
                )?;
                check_range("calibration.num_segments", acc.num_segments as f64, 2.0, 100.0)?;
                check_range("calibration.pressure_advance", acc.pressure_advance, 0.0, 2.0)?;
                check_range("calibration.model_height", acc.model_height, 1.0, 100.0)?;
                if acc.model_height < 2.0 * md.layer_height {
                    return Err(ConfigError::InvalidValue {
                        key: "calibration.model_height".to_string(),
                        reason: "must be at least two layers tall".to_string(),
                    });
                }
            }
        }

        let footprint = self.calibration.raft_width() + 2.0 * PURGE_EDGE_MARGIN;
        if footprint > m.bed_x.min(m.bed_y) {
            return Err(ConfigError::InvalidValue {
                key: "calibration.num_segments".to_string(),
                reason: format!(
                    "calibration body needs {:.1} mm of bed but only {:.1} mm is available",
                    footprint,
                    m.bed_x.min(m.bed_y)
                ),
            });
        }

        Ok(())
    }
}
