//! # PlotKit
//!
//! Turns the 2D G-code produced by DXF/SVG plotting converters into
//! machine-ready programs for 3D printers and small CNC machines:
//! - Tiling of a unit cell over an Nx × Ny grid with scale and spacing
//! - Multiple cycles with per-cycle Z offset and a between-cycle subroutine
//! - Part and work-area outline skirts
//! - Start-cut / end-cut command retargeting and feed-rate annotation
//!
//! ## Architecture
//!
//! PlotKit is organized as a workspace with multiple crates:
//!
//! 1. **plotkit-core** - Error types
//! 2. **plotkit-toolpath** - Line model, rewrite stages, job driver
//! 3. **plotkit-settings** - Job files and parameter resolution
//! 4. **plotkit** - Command line binary that integrates all crates

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

pub use plotkit_core::{ConfigError, Error, GcodeError, Result};

pub use plotkit_settings::{
    JobConfig, NumberInput, ParameterWarning, ResolvedJob, SettingsError, SettingsResult,
};

pub use plotkit_toolpath::{
    BoundingExtent, MachineCodes, Measurement, NumberFormat, PipelineConfig, RunReport,
    ToolpathJob, WorkArea,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so program text can be piped from stdout
/// - RUST_LOG environment variable support
/// - Optional JSON lines instead of human readable output
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

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
            .with_target(false)
            .with_level(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Run the full pipeline from an input file to an output file
///
/// The output file is replaced only when the whole pipeline succeeds.
pub fn process_file(input: &Path, output: &Path, config: &PipelineConfig) -> Result<RunReport> {
    require_path(input, "input")?;
    require_path(output, "output")?;

    let job = ToolpathJob::new(config.clone())?;
    let text = std::fs::read_to_string(input)?;
    let result = job.run(&text)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(result.text.as_bytes())?;
    staged.flush()?;
    staged.persist(output).map_err(|e| e.error)?;

    tracing::info!(
        "Wrote {} lines to {}",
        result.report.output_lines,
        output.display()
    );
    Ok(result.report)
}

/// Measure the unit cell in an input file without producing output
pub fn measure_file(input: &Path, config: &PipelineConfig) -> Result<Measurement> {
    require_path(input, "input")?;

    let job = ToolpathJob::new(config.clone())?;
    let text = std::fs::read_to_string(input)?;
    Ok(job.measure(&text)?)
}

fn require_path(path: &Path, name: &str) -> std::result::Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingPath(name.to_string()));
    }
    Ok(())
}
