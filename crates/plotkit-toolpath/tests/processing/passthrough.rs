use plotkit_core::GcodeError;
use plotkit_toolpath::{PipelineConfig, TilingSpec, ToolpathJob};

#[test]
fn test_malformed_field_line_passes_through() {
    let config = PipelineConfig {
        tiling: TilingSpec::new(2, 1, 5.0, 0.0, 1.0),
        ..PipelineConfig::default()
    };
    let job = ToolpathJob::new(config).unwrap();
    let output = job.run("G01 X10 Y0\nG01 Xabc Y5 F100\n").unwrap();
    let lines: Vec<&str> = output.text.lines().collect();

    // Tiled twice, untouched both times
    assert_eq!(
        lines.iter().filter(|line| **line == "G01 Xabc Y5 F100").count(),
        2
    );
    assert!(lines.contains(&"G01 X15 Y0 F4500"));

    let diagnostics = &output.report.measurement.diagnostics;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line_number(), Some(2));
    assert!(matches!(
        &diagnostics[0],
        GcodeError::InvalidParameter { param, .. } if param == "X"
    ));
}

#[test]
fn test_comments_and_blank_lines_are_preserved() {
    let job = ToolpathJob::new(PipelineConfig::default()).unwrap();
    let output = job
        .run("; header X99\n\n(setup)\nG01 X4 Y2 ; Fast\nG00 X0 Y0\n")
        .unwrap();
    let text = output.text;

    assert!(text.contains("; header X99\n\n(setup)\n"));
    // Feed letter inside the comment suppresses annotation
    assert!(text.contains("G01 X4 Y2 ; Fast\n"));
    assert!(text.contains("G00 X0 Y0 F9000\n"));
    assert_eq!(output.report.measurement.extent.max_positive_x, 4.0);
}

#[test]
fn test_measure_only() {
    let job = ToolpathJob::new(PipelineConfig::default()).unwrap();
    let measurement = job.measure("G01 X10 Y-5\n").unwrap();
    assert_eq!(measurement.extent.span_x(), 10.0);
    assert_eq!(measurement.extent.span_y(), 5.0);
    assert_eq!(
        measurement.work_area.to_string(),
        "Part Bounds: X: 10mm  Y: 5mm\nWork Bounds: X: 10mm  Y: 5mm"
    );
}

#[test]
fn test_blank_input_is_an_error() {
    let job = ToolpathJob::new(PipelineConfig::default()).unwrap();
    assert!(matches!(job.run(""), Err(GcodeError::EmptyInput)));
    assert!(matches!(job.measure(""), Err(GcodeError::EmptyInput)));
}
