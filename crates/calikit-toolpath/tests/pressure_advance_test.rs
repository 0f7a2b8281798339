use calikit_settings::{Configuration, FeedRateUnits, FirmwareDialect, Kinematics};
use calikit_toolpath::firmware::NO_FIRMWARE_COMMENT;
use calikit_toolpath::{generate, generate_lines, WriterSink};

fn tower_config() -> Configuration {
    let mut config = Configuration::pressure_advance_default();
    config.machine.bed_x = 220.0;
    config.machine.bed_y = 220.0;
    config.model.layer_height = 0.2;
    config.first_layer.line_width = 0.4;
    if let calikit_settings::Calibration::PressureAdvance(pa) = &mut config.calibration {
        pa.num_segments = 5;
        pa.start_k_factor = 0.0;
        pa.end_k_factor = 0.5;
        pa.segment_height = 3.0;
    }
    config.validate().unwrap();
    config
}

fn word(line: &str, letter: char) -> Option<f64> {
    line.split_whitespace()
        .skip(1)
        .find(|w| w.starts_with(letter))
        .and_then(|w| w[1..].parse().ok())
}

fn is_extruder_only(line: &str) -> bool {
    line.starts_with("G1 E")
}

#[test]
fn test_segment_table() {
    let lines = generate_lines(&tower_config()).unwrap();
    let table: Vec<&str> = lines
        .iter()
        .filter(|l| l.starts_with("; Segment:"))
        .map(String::as_str)
        .collect();
    assert_eq!(
        table,
        vec![
            "; Segment:5 K-Factor:0.500",
            "; Segment:4 K-Factor:0.375",
            "; Segment:3 K-Factor:0.250",
            "; Segment:2 K-Factor:0.125",
            "; Segment:1 K-Factor:0.000",
        ]
    );
}

#[test]
fn test_first_move_after_g92_is_travel_to_purge() {
    let lines = generate_lines(&tower_config()).unwrap();
    let g92 = lines.iter().position(|l| l == "G92 Z0.20").unwrap();
    assert_eq!(lines[g92 - 1], "G1 Z0.20");
    let first_move = lines[g92 + 1..]
        .iter()
        .find(|l| l.starts_with("G1"))
        .unwrap();
    assert_eq!(first_move, "G1 X15.00 Y60.00 F9000");
    assert!(word(first_move, 'E').is_none());
}

#[test]
fn test_k_factor_sequence() {
    let lines = generate_lines(&tower_config()).unwrap();
    let commands: Vec<&str> = lines
        .iter()
        .filter(|l| l.starts_with("M900"))
        .map(String::as_str)
        .collect();
    assert_eq!(
        commands,
        vec!["M900 K0.000", "M900 K0.125", "M900 K0.250", "M900 K0.375", "M900 K0.500"]
    );

    // each new value is set right after its layer header
    let second = lines.iter().position(|l| l == "M900 K0.125").unwrap();
    assert_eq!(lines[second - 1], ";layer #15");
}

#[test]
fn test_layers_and_fan() {
    let lines = generate_lines(&tower_config()).unwrap();
    let layers: Vec<&String> = lines.iter().filter(|l| l.starts_with(";layer #")).collect();
    assert_eq!(layers.len(), 5 * 15 - 1);
    assert_eq!(layers[0], ";layer #1");
    assert_eq!(layers[layers.len() - 1], ";layer #74");

    let fan: Vec<&str> = lines
        .iter()
        .filter(|l| l.starts_with("M106 S") && *l != "M106 S0")
        .map(String::as_str)
        .collect();
    assert_eq!(fan, vec!["M106 S85", "M106 S170", "M106 S255"]);
}

#[test]
fn test_retractions_are_paired() {
    let lines = generate_lines(&tower_config()).unwrap();
    let retractions: Vec<&String> = lines.iter().filter(|l| is_extruder_only(l)).collect();
    // around the raft travel and around the travel into the tower
    assert_eq!(retractions.len(), 4);
    for pair in retractions.chunks(2) {
        let pulled = word(pair[0], 'E').unwrap();
        let restored = word(pair[1], 'E').unwrap();
        assert!((restored - pulled - 1.0).abs() < 1e-3);
        assert!(pair[0].ends_with(" F2100"));
    }
}

#[test]
fn test_extruder_and_height_never_go_back() {
    let lines = generate_lines(&tower_config()).unwrap();
    let mut last_e = 0.0;
    let mut last_z = 0.0;
    for line in lines.iter().filter(|l| l.starts_with("G1 ")) {
        assert!(line.contains(" F"), "missing feed in {}", line);
        if let Some(z) = word(line, 'Z') {
            assert!(z >= last_z, "Z went down in {}", line);
            last_z = z;
        }
        if !is_extruder_only(line) {
            if let Some(e) = word(line, 'E') {
                assert!(e > last_e, "E went back in {}", line);
                last_e = e;
            }
        }
    }
    assert!(last_e > 0.0);
}

#[test]
fn test_end_block() {
    let lines = generate_lines(&tower_config()).unwrap();
    let end = lines.iter().position(|l| l == ";end gcode").unwrap();
    // 74 body layers above the raft
    assert_eq!(lines[end + 1], "G1 Z20.00 F600");
    assert_eq!(lines.last().map(String::as_str), Some("M84"));
}

#[test]
fn test_unknown_firmware_degrades_to_comments() {
    let mut config = tower_config();
    config.machine.firmware = FirmwareDialect::from("prusa".to_string());
    let lines = generate_lines(&config).unwrap();
    assert!(!lines.iter().any(|l| l.starts_with("M900")));
    let comments = lines.iter().filter(|l| *l == NO_FIRMWARE_COMMENT).count();
    assert_eq!(comments, 5);
    assert!(lines.iter().any(|l| l == "; Firmware: Unknown"));
}

#[test]
fn test_klipper_with_probe() {
    let mut config = tower_config();
    config.machine.firmware = FirmwareDialect::Klipper;
    config.machine.bed_probe = true;
    let lines = generate_lines(&config).unwrap();
    assert!(lines.iter().any(|l| l == "BED_MESH_CALIBRATE"));
    assert!(lines.iter().any(|l| l == "SET_PRESSURE_ADVANCE ADVANCE=0.500"));
}

#[test]
fn test_delta_and_feed_units() {
    let mut config = tower_config();
    config.machine.kinematics = Kinematics::Delta;
    config.machine.feed_rate_units = FeedRateUnits::MmPerSec;
    let lines = generate_lines(&config).unwrap();
    let g92 = lines.iter().position(|l| l == "G92 Z0.20").unwrap();
    assert_eq!(lines[g92 + 1], "G1 X-95.00 Y-50.00 F150");
}

#[test]
fn test_writer_sink_matches_lines() {
    let config = tower_config();
    let lines = generate_lines(&config).unwrap();

    let mut sink = WriterSink::new(Vec::new());
    let summary = generate(&config, &mut sink).unwrap();
    assert_eq!(summary.lines, lines.len());
    assert_eq!(summary.calibration, "LA");
    assert_eq!(summary.segments, 5);
    assert!((summary.final_z - 20.0).abs() < 1e-6);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(text, lines.join("\n") + "\n");
}

#[test]
fn test_generation_is_deterministic() {
    let config = tower_config();
    assert_eq!(generate_lines(&config).unwrap(), generate_lines(&config).unwrap());
}
