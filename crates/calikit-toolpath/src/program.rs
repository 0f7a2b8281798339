//! Program assembly shared by both calibration modes
//!
//! [`ProgramWriter`] owns the motion state of a run and forwards every
//! finished line to the sink. Planners hand it moves; it decides nothing
//! about geometry.

use crate::error::ToolpathResult;
use crate::extrusion::ExtrusionCalculator;
use crate::firmware::{command, set_control_value, ControlKind, FirmwareAction};
use crate::geometry::Move;
use crate::motion::{CommandEmitter, MotionState};
use crate::ramp::ParameterRamp;
use crate::retraction::RetractionController;
use crate::sink::GcodeSink;
use crate::VERSION;
use calikit_core::units::AXIS_PRECISION;
use calikit_core::{format_fixed, Point};
use calikit_settings::{Calibration, Configuration, FirmwareDialect};
use tracing::warn;

/// Lift after the last layer (mm)
pub const END_LIFT: f64 = 5.0;
/// Speed of the final lift (mm/s)
pub const END_LIFT_SPEED: u32 = 10;

/// Substitute `$BEDTEMP`, `$HOTTEMP`, `$FLOW`, `$G28` and `$G29` in a start block
///
/// `$G28` homes in the dialect of the machine. Blank lines, including a
/// `$G29` line with probing disabled, are dropped.
pub fn expand_start_gcode(config: &Configuration) -> Vec<String> {
    let probe = if config.machine.bed_probe {
        command(FirmwareAction::Probe, config.machine.firmware)
    } else {
        String::new()
    };
    config
        .gcode
        .start
        .replace("$BEDTEMP", &config.filament.bed_temperature.to_string())
        .replace("$HOTTEMP", &config.filament.hotend_temperature.to_string())
        .replace("$FLOW", &config.filament.flow.to_string())
        .replace("$G28", &command(FirmwareAction::Home, config.machine.firmware))
        .replace("$G29", &probe)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Writes a calibration program into a sink
pub struct ProgramWriter<'a, S: GcodeSink + ?Sized> {
    sink: &'a mut S,
    config: &'a Configuration,
    emitter: CommandEmitter,
    retraction: RetractionController,
    state: MotionState,
    lines: usize,
}

impl<'a, S: GcodeSink + ?Sized> ProgramWriter<'a, S> {
    pub fn new(config: &'a Configuration, sink: &'a mut S) -> Self {
        if config.machine.firmware == FirmwareDialect::Unknown {
            warn!("No firmware information, control commands are written as comments");
        }
        let units = config.machine.feed_rate_units;
        Self {
            sink,
            config,
            emitter: CommandEmitter::new(
                ExtrusionCalculator::new(config.model.layer_height),
                units,
            ),
            retraction: RetractionController::new(
                config.filament.retract_length,
                config.filament.retract_speed,
                units,
            ),
            state: MotionState::new(Point::default(), config.first_layer.print_speed),
            lines: 0,
        }
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    /// Lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn line(&mut self, line: &str) -> ToolpathResult<()> {
        self.sink.push_line(line)?;
        self.lines += 1;
        Ok(())
    }

    /// Header comments with the segment table and the print settings
    pub fn header(&mut self, kind: ControlKind, ramp: &ParameterRamp) -> ToolpathResult<()> {
        let c = self.config;
        self.line(&format!(
            "; generated by calikit {} ({} calibration)",
            VERSION,
            c.calibration.short_name()
        ))?;
        for segment in ramp.segments() {
            self.line(&format!(
                "; Segment:{} {}:{}",
                segment.number,
                kind.label(),
                kind.format_value(segment.value)
            ))?;
        }
        self.line(&format!(
            "; Bedsize: {}:{}",
            format_fixed(c.machine.bed_x, 0),
            format_fixed(c.machine.bed_y, 0)
        ))?;
        self.line(&format!(
            "; Temperature H:{} B:{} °C",
            c.filament.hotend_temperature, c.filament.bed_temperature
        ))?;
        self.line(&format!(
            "; Line width: {}-{} mm",
            format_fixed(c.model.line_width, 2),
            format_fixed(c.first_layer.line_width, 2)
        ))?;
        self.line(&format!(
            "; Layer height: {} mm",
            format_fixed(c.model.layer_height, 2)
        ))?;
        match &c.calibration {
            Calibration::PressureAdvance(pa) => {
                self.line(&format!(
                    "; Segments: {}x{} mm",
                    pa.num_segments,
                    format_fixed(pa.segment_height, 2)
                ))?;
                self.line(&format!(
                    "; Print speed: {}, {}, {} mm/s",
                    c.first_layer.print_speed, pa.slow_print_speed, pa.fast_print_speed
                ))?;
            }
            Calibration::Acceleration(acc) => {
                self.line(&format!(
                    "; Segments: {} teeth, {} mm high",
                    acc.num_segments,
                    format_fixed(acc.model_height, 2)
                ))?;
                self.line(&format!(
                    "; Print speed: {}, {} mm/s",
                    c.first_layer.print_speed, acc.print_speed
                ))?;
                self.line(&format!(
                    "; Slow acceleration: {} mm/s2, K-Factor: {}",
                    acc.slow_acceleration,
                    ControlKind::PressureAdvance.format_value(acc.pressure_advance)
                ))?;
            }
        }
        self.line(&format!(
            "; Retractions: {}mm @ {} mm/s",
            format_fixed(c.filament.retract_length, 2),
            c.filament.retract_speed
        ))?;
        self.line(&format!("; Firmware: {}", c.machine.firmware))
    }

    /// Custom start G-code with its placeholders filled in
    pub fn start_block(&mut self) -> ToolpathResult<()> {
        for line in expand_start_gcode(self.config) {
            self.line(&line)?;
        }
        Ok(())
    }

    /// Set a calibrated parameter
    pub fn control(&mut self, kind: ControlKind, value: f64) -> ToolpathResult<()> {
        self.line(&set_control_value(kind, value, self.config.machine.firmware))
    }

    /// Drop to the first layer and make the printer treat it as layer height
    pub fn first_layer_height(&mut self) -> ToolpathResult<()> {
        let lh = self.config.model.layer_height;
        self.line(&format!(
            "G1 Z{}",
            format_fixed(lh + self.config.first_layer.z_offset, AXIS_PRECISION)
        ))?;
        self.line(&format!("G92 Z{}", format_fixed(lh, AXIS_PRECISION)))?;
        self.state.position.z = lh;
        Ok(())
    }

    pub fn emit(&mut self, mv: &Move) -> ToolpathResult<()> {
        let line = self.emitter.emit(&mut self.state, mv);
        self.line(&line)
    }

    pub fn emit_all(&mut self, moves: &[Move]) -> ToolpathResult<()> {
        moves.iter().try_for_each(|mv| self.emit(mv))
    }

    /// Move from the current position to `target`
    pub fn move_to(&mut self, target: Point, width: f64, speed: u32) -> ToolpathResult<()> {
        let line = self.emitter.emit_move(&mut self.state, target, width, speed);
        self.line(&line)
    }

    pub fn retract(&mut self) -> ToolpathResult<()> {
        match self.retraction.retract(&mut self.state) {
            Some(line) => self.line(&line),
            None => Ok(()),
        }
    }

    pub fn deretract(&mut self) -> ToolpathResult<()> {
        match self.retraction.deretract(&mut self.state) {
            Some(line) => self.line(&line),
            None => Ok(()),
        }
    }

    /// Retract, travel to `target` and deretract
    pub fn retracted_travel(&mut self, target: Point, speed: u32) -> ToolpathResult<()> {
        self.retract()?;
        self.move_to(target, 0.0, speed)?;
        self.deretract()
    }

    /// Layer comment and the fan ramp over the first three layers
    pub fn layer_header(&mut self, layer: u32) -> ToolpathResult<()> {
        self.line(&format!(";layer #{}", layer))?;
        if layer < 4 {
            let pwm = self.config.filament.fan_pwm() * layer / 3;
            self.line(&format!("M106 S{}", pwm))?;
        }
        Ok(())
    }

    /// Lift away from the print and run the custom end G-code
    pub fn end_block(&mut self) -> ToolpathResult<()> {
        self.line(";end gcode")?;
        let lifted = self.state.position.offset(0.0, 0.0, END_LIFT);
        self.move_to(lifted, 0.0, END_LIFT_SPEED)?;
        let config = self.config;
        for line in config.gcode.end.lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.line(line)?;
        }
        Ok(())
    }

    /// Flush the sink
    pub fn finish(self) -> ToolpathResult<(usize, MotionState)> {
        self.sink.finish()?;
        Ok((self.lines, self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::warnings;

    #[test]
    fn test_expand_start_gcode() {
        let mut config = Configuration::default();
        let lines = expand_start_gcode(&config);
        assert!(lines.contains(&"M190 S60".to_string()));
        assert!(lines.contains(&"M109 S220".to_string()));
        assert!(lines.contains(&"M221 S100".to_string()));
        assert!(!lines.iter().any(|l| l.contains('$') || l.is_empty()));
        assert!(!lines.contains(&"G29".to_string()));

        config.machine.bed_probe = true;
        config.machine.firmware = FirmwareDialect::Klipper;
        let lines = expand_start_gcode(&config);
        let home = lines.iter().position(|l| l == "G28").unwrap();
        assert_eq!(lines[home + 1], "BED_MESH_CALIBRATE");
    }

    #[test]
    fn test_home_placeholder_follows_dialect() {
        let mut config = Configuration::default();
        config.gcode.start = "$G28 X Y\nG1 Z5".to_string();
        assert_eq!(expand_start_gcode(&config), vec!["G28 X Y", "G1 Z5"]);
        config.machine.firmware = FirmwareDialect::Unknown;
        assert_eq!(
            expand_start_gcode(&config),
            vec![command(FirmwareAction::Home, FirmwareDialect::Unknown), "G1 Z5".to_string()]
        );
    }

    #[test]
    fn test_first_layer_height_with_offset() {
        let mut config = Configuration::default();
        config.first_layer.z_offset = -0.05;
        let mut sink: Vec<String> = Vec::new();
        let mut writer = ProgramWriter::new(&config, &mut sink);
        writer.first_layer_height().unwrap();
        assert_eq!(writer.position().z, 0.2);
        assert_eq!(writer.lines(), 2);
        drop(writer);
        assert_eq!(sink, vec!["G1 Z0.15", "G92 Z0.20"]);
    }

    #[test]
    fn test_layer_header_fan_ramp() {
        let mut config = Configuration::default();
        config.filament.cooling = 50;
        let mut sink: Vec<String> = Vec::new();
        let mut writer = ProgramWriter::new(&config, &mut sink);
        for layer in 1..5 {
            writer.layer_header(layer).unwrap();
        }
        drop(writer);
        // 50 % is 128 of 255
        assert_eq!(
            sink,
            vec![
                ";layer #1", "M106 S42", ";layer #2", "M106 S85", ";layer #3", "M106 S128",
                ";layer #4",
            ]
        );
    }

    #[test]
    fn test_retracted_travel() {
        let config = Configuration::default();
        let mut sink: Vec<String> = Vec::new();
        let mut writer = ProgramWriter::new(&config, &mut sink);
        writer.retracted_travel(Point::new(10.0, 10.0, 0.0), 150).unwrap();
        // a second deretract is ignored
        writer.deretract().unwrap();
        assert!(!writer.state().is_retracted());
        drop(writer);
        assert_eq!(
            sink,
            vec!["G1 E-1.0000 F2100", "G1 X10.00 Y10.00 F9000", "G1 E0.0000 F2100"]
        );
    }

    #[test]
    fn test_end_block_lifts() {
        let config = Configuration::default();
        let mut sink: Vec<String> = Vec::new();
        let mut writer = ProgramWriter::new(&config, &mut sink);
        writer.first_layer_height().unwrap();
        writer.end_block().unwrap();
        let (lines, state) = writer.finish().unwrap();
        assert_eq!(lines, sink.len());
        assert!((state.position.z - 5.2).abs() < 1e-12);
        assert_eq!(sink[2], ";end gcode");
        assert_eq!(sink[3], "G1 Z5.20 F600");
        assert_eq!(sink.last().map(String::as_str), Some("M84"));
    }

    #[test]
    fn test_unknown_firmware_warns_once() {
        let mut config = Configuration::default();
        config.machine.firmware = FirmwareDialect::Unknown;
        let mut sink: Vec<String> = Vec::new();
        let (_, logs) = warnings(|| {
            let mut writer = ProgramWriter::new(&config, &mut sink);
            for value in [0.0, 0.01, 0.02] {
                writer.control(ControlKind::PressureAdvance, value).unwrap();
            }
        });
        assert_eq!(logs.matches("No firmware information").count(), 1);
        assert_eq!(sink, vec![";no firmware information"; 3]);
    }
}
