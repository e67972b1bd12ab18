use plotkit_toolpath::{
    CommandMapping, CycleSpec, MoveKind, NumberFormat, PipelineConfig, TilingSpec,
    ToolpathDocument, ToolpathJob,
};

const SQUARE: &str = "G00 X0 Y0\nM09\nG01 X10 Y0\nG01 X10 Y10\nG01 X0 Y10\nG01 X0 Y0\nM10\nM02\n";

#[test]
fn test_single_square_single_cycle() {
    let job = ToolpathJob::new(PipelineConfig::default()).unwrap();
    let output = job.run(SQUARE).unwrap();

    let expected = "\
G01 X10 Y0 F4500
G01 X10 Y10 F4500
G01 X0 Y10 F4500
G01 X0 Y0 F4500
G4 S2
G01 X10 Y0 F4500
G01 X10 Y10 F4500
G01 X0 Y10 F4500
G01 X0 Y0 F4500
G4 S2
G00 X0 Y0 F9000
G01 Z-3 F4500
G01 X10 Y0 F4500
G01 X10 Y10 F4500
G01 X0 Y10 F4500
G01 X0 Y0 F4500
G01 Z0 F4500
M02
";
    assert_eq!(output.text, expected);

    let report = output.report;
    assert_eq!(report.measurement.work_area.part_width, 10.0);
    assert_eq!(report.measurement.work_area.work_height, 10.0);
    assert_eq!(report.measurement.input_lines, 8);
    assert_eq!(report.output_lines, 18);
    assert!(report.measurement.diagnostics.is_empty());
}

#[test]
fn test_tiled_and_cycled_program() {
    let config = PipelineConfig {
        tiling: TilingSpec::new(2, 1, 15.0, 0.0, 1.0),
        cycles: CycleSpec::new(2, -0.086, "M0"),
        preamble: "G21\nG90".to_string(),
        ..PipelineConfig::default()
    };
    let job = ToolpathJob::new(config).unwrap();
    let output = job.run(SQUARE).unwrap();
    let lines: Vec<&str> = output.text.lines().collect();

    assert_eq!(&lines[..2], &["G21", "G90"]);
    // Work skirt covers both tiles plus the gap between them
    assert_eq!(lines[7], "G01 X35 Y0 F4500");
    assert_eq!(lines[8], "G01 X35 Y10 F4500");

    // One end-of-program marker, at the very end
    assert_eq!(lines.iter().filter(|line| **line == "M02").count(), 1);
    assert_eq!(lines.last(), Some(&"M02"));

    // One transition block between the two cycles
    let lift = lines.iter().position(|line| *line == "G92 Z0").unwrap();
    assert_eq!(lines[lift - 1], "G01 Z0 F4500");
    assert_eq!(lines[lift + 1], "M0");
    assert_eq!(lines.iter().filter(|line| **line == "G92 Z0").count(), 1);

    // Second tile shifted by the spacing
    assert!(lines.contains(&"G00 X15 Y0 F9000"));
    assert!(lines.contains(&"G01 X25 Y10 F4500"));

    // Every move carries a feed
    let document = ToolpathDocument::parse(&output.text, &job.config().codes).document;
    for line in document.iter().filter_map(|line| line.as_move()) {
        assert!(line.feed().is_some(), "missing feed on '{}'", line.text());
    }
    // 2 tiles x 2 cycles, plus the skirts
    assert_eq!(document.count_moves(MoveKind::Travel), 4);
}

#[test]
fn test_scale_and_precision() {
    let config = PipelineConfig {
        tiling: TilingSpec::new(1, 1, 0.0, 0.0, 0.1),
        format: NumberFormat::with_precision(3),
        ..PipelineConfig::default()
    };
    let job = ToolpathJob::new(config).unwrap();
    let output = job.run("G01 X3 Y-1\n").unwrap();
    let lines: Vec<&str> = output.text.lines().collect();

    assert_eq!(lines[0], "G01 X0.3 Y0 F4500");
    assert_eq!(lines[1], "G01 X0.3 Y0.1 F4500");
    assert_eq!(lines.last(), Some(&"M02"));
    assert!(lines.contains(&"G01 X0.3 Y-0.1 F4500"));
}

#[test]
fn test_custom_mappings() {
    let config = PipelineConfig {
        start_cut: CommandMapping::new("M3", "M106 S255"),
        end_cut: CommandMapping::new("M5", "M107"),
        ..PipelineConfig::default()
    };
    let job = ToolpathJob::new(config).unwrap();
    let output = job.run("M3\nG01 X1 Y1\nM5\nM30\n").unwrap();
    let lines: Vec<&str> = output.text.lines().collect();

    assert!(lines.contains(&"M106 S255"));
    assert!(lines.contains(&"M107"));
    assert!(lines.contains(&"M30"));
    assert!(!lines.contains(&"M3"));
}
