//! CLI tests for the `plotkit` binary.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

const SQUARE: &str = "G00 X0 Y0\nM09\nG01 X10 Y0\nG01 X10 Y10\nG01 X0 Y10\nG01 X0 Y0\nM10\nM02\n";

fn plotkit_cmd() -> Command {
    Command::new(cargo::cargo_bin!("plotkit"))
}

fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write temp file");
    (dir, path)
}

#[test]
fn process_writes_tiled_program() {
    let (dir, input) = write_temp("cell.gcode", SQUARE);
    let output = dir.path().join("out.gcode");

    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--tiles-x", "2", "--spacing-x", "15", "--cycles", "1"])
        .args(["--cycle-z-offset", "-0.1"])
        .output()
        .expect("run process");
    assert!(
        result.status.success(),
        "expected process to succeed, stderr={}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(result.stdout.is_empty());

    let text = fs::read_to_string(&output).expect("read output");
    assert!(text.starts_with("M201 X1000"));
    assert!(text.contains("G01 X35 Y10 F4500\n"));
    assert!(text.contains("G00 X15 Y0 F9000\n"));
    assert!(text.ends_with("M02\n"));
    assert!(!text.contains("M09"));
}

#[test]
fn process_with_bad_number_warns_and_continues() {
    let (dir, input) = write_temp("cell.gcode", SQUARE);
    let output = dir.path().join("out.gcode");

    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--spacing-y", "wide"])
        .output()
        .expect("run process");
    assert!(result.status.success());

    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("tiling.spacing_y"),
        "missing parameter warning: {stderr}"
    );
    assert!(output.exists());
}

#[test]
fn process_with_bad_counts_runs_with_defaults() {
    let (dir, input) = write_temp("cell.gcode", SQUARE);
    let output = dir.path().join("out.gcode");

    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--cycles", "abc"])
        .output()
        .expect("run process");
    assert!(
        result.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(String::from_utf8_lossy(&result.stderr).contains("cycles.count"));
    let text = fs::read_to_string(&output).expect("read output");
    assert!(!text.contains("G92 Z0"));
    assert!(!text.contains("M106 S255"));

    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--tiles-x", "nope"])
        .output()
        .expect("run process");
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("tiling.count_x"));
    let text = fs::read_to_string(&output).expect("read output");
    assert!(!text.contains("G00 X0 Y0 F9000\nG01 Z-3"));
    assert!(text.ends_with("M02\n"));
}

#[test]
fn process_failure_writes_nothing() {
    let (dir, input) = write_temp("cell.gcode", SQUARE);
    let output = dir.path().join("out.gcode");

    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--scale", "0"])
        .output()
        .expect("run process");
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("tiling.scale"));
    assert!(!output.exists());

    let (_empty_dir, empty) = write_temp("empty.gcode", "");
    let result = plotkit_cmd()
        .arg("process")
        .arg(&empty)
        .arg("-o")
        .arg(&output)
        .output()
        .expect("run process");
    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn process_requires_output() {
    let (_dir, input) = write_temp("cell.gcode", SQUARE);
    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .output()
        .expect("run process");
    assert!(!result.status.success());
}

#[test]
fn bounds_prints_part_and_work_area() {
    let (_dir, input) = write_temp("cell.gcode", "G01 X10 Y-5\n");

    let result = plotkit_cmd()
        .arg("bounds")
        .arg(&input)
        .args(["--tiles-y", "3", "--spacing-y", "2"])
        .output()
        .expect("run bounds");
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert_eq!(
        stdout.trim_end(),
        "Part Bounds: X: 10mm  Y: 5mm\nWork Bounds: X: 10mm  Y: 19mm"
    );
}

#[test]
fn bounds_json() {
    let (_dir, input) = write_temp("cell.gcode", "G01 X10 Y-5\n");

    let result = plotkit_cmd()
        .arg("bounds")
        .arg(&input)
        .arg("--json")
        .output()
        .expect("run bounds");
    assert!(result.status.success());

    let value: serde_json::Value = serde_json::from_slice(&result.stdout).expect("valid json");
    assert_eq!(value["extent"]["max_positive_x"], 10.0);
    assert_eq!(value["extent"]["max_negative_y"], 5.0);
    assert_eq!(value["work_area"]["part_height"], 5.0);
}

#[test]
fn init_then_process_with_job_file() {
    let (dir, input) = write_temp("cell.gcode", SQUARE);
    let job = dir.path().join("job.toml");
    let output = dir.path().join("out.gcode");

    let result = plotkit_cmd()
        .arg("init")
        .arg(&job)
        .output()
        .expect("run init");
    assert!(result.status.success());

    let edited = fs::read_to_string(&job)
        .expect("read job file")
        .replace("start_cut_new = \"G01 Z-3\"", "start_cut_new = \"M106 S255\"");
    fs::write(&job, edited).expect("write job file");

    let result = plotkit_cmd()
        .arg("process")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&job)
        .output()
        .expect("run process");
    assert!(
        result.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&result.stderr)
    );
    let text = fs::read_to_string(&output).expect("read output");
    assert!(text.contains("\nM106 S255\n"));

    let again = plotkit_cmd()
        .arg("init")
        .arg(&job)
        .output()
        .expect("run init");
    assert!(!again.status.success());
}
