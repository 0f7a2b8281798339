//! Firmware specific command text
//!
//! Each abstract action maps to exactly one line per dialect. An unknown
//! dialect produces a comment instead of a command so the rest of the
//! program can still be inspected.

use calikit_core::format_fixed;
use calikit_core::units::PARAMETER_PRECISION;
use calikit_settings::FirmwareDialect;

/// Comment emitted when the firmware is unknown
pub const NO_FIRMWARE_COMMENT: &str = ";no firmware information";

/// Parameter being calibrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Pressure advance / linear advance K-factor
    PressureAdvance,
    /// Print acceleration (mm/s²)
    Acceleration,
}

impl ControlKind {
    /// Header label of the parameter
    pub fn label(&self) -> &'static str {
        match self {
            Self::PressureAdvance => "K-Factor",
            Self::Acceleration => "Acceleration",
        }
    }

    /// Format a value of this parameter
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::PressureAdvance => format_fixed(value, PARAMETER_PRECISION),
            Self::Acceleration => format_fixed(value, 0),
        }
    }
}

/// Firmware level action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirmwareAction {
    /// Set the pressure advance K-factor
    SetPressureAdvance(f64),
    /// Set the print acceleration
    SetAcceleration(f64),
    /// Home all axes
    Home,
    /// Probe the bed
    Probe,
}

/// Command line for `action` in `dialect`
pub fn command(action: FirmwareAction, dialect: FirmwareDialect) -> String {
    use FirmwareAction::*;
    use FirmwareDialect::*;

    match (action, dialect) {
        (SetPressureAdvance(k), Marlin) => format!(
            "M900 K{}",
            ControlKind::PressureAdvance.format_value(k)
        ),
        (SetPressureAdvance(k), Klipper) => format!(
            "SET_PRESSURE_ADVANCE ADVANCE={}",
            ControlKind::PressureAdvance.format_value(k)
        ),
        (SetPressureAdvance(k), RepRapFirmware) => format!(
            "M572 D0 S{}",
            ControlKind::PressureAdvance.format_value(k)
        ),
        (SetAcceleration(a), Marlin) => {
            format!("M204 S{}", ControlKind::Acceleration.format_value(a))
        }
        (SetAcceleration(a), Klipper) => format!(
            "SET_VELOCITY_LIMIT ACCEL={}",
            ControlKind::Acceleration.format_value(a)
        ),
        (SetAcceleration(a), RepRapFirmware) => {
            let a = ControlKind::Acceleration.format_value(a);
            format!("M204 P{} T{}", a, a)
        }
        (Home, _) => "G28".to_string(),
        (Probe, Marlin) | (Probe, RepRapFirmware) => "G29".to_string(),
        (Probe, Klipper) => "BED_MESH_CALIBRATE".to_string(),
        (SetPressureAdvance(_), Unknown) | (SetAcceleration(_), Unknown) | (Probe, Unknown) => {
            NO_FIRMWARE_COMMENT.to_string()
        }
    }
}

/// Command line setting `kind` to `value`
pub fn set_control_value(kind: ControlKind, value: f64, dialect: FirmwareDialect) -> String {
    let action = match kind {
        ControlKind::PressureAdvance => FirmwareAction::SetPressureAdvance(value),
        ControlKind::Acceleration => FirmwareAction::SetAcceleration(value),
    };
    command(action, dialect)
}
