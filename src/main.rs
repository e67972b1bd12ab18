use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use plotkit::{
    init_logging, measure_file, process_file, JobConfig, NumberInput, PipelineConfig, BUILD_DATE,
    VERSION,
};

#[derive(Parser, Debug)]
#[command(
    name = "plotkit",
    version,
    about = "Tile, cycle and retarget pen-plotter G-code for 3D printers and small CNC machines"
)]
struct Cli {
    /// Emit log records as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Rewrite a unit-cell toolpath into the final machine program.
    Process {
        /// Unit-cell G-code produced by the converter.
        input: PathBuf,
        /// Destination for the final program. Untouched if processing fails.
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        job: JobArgs,
    },

    /// Print the part and work-area bounds of a unit cell.
    Bounds {
        input: PathBuf,
        /// Print the bounds as JSON on stdout.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        job: JobArgs,
    },

    /// Write a job file holding the default settings (.toml or .json).
    Init {
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Job file plus per-run overrides. Numbers are taken as text so that a bad
/// value falls back to zero with a warning instead of stopping the run.
#[derive(Args, Debug)]
struct JobArgs {
    /// Job file (.toml or .json). Defaults are used when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long, value_name = "TOKEN")]
    start_cut_old: Option<String>,
    #[arg(long, value_name = "COMMAND")]
    start_cut_new: Option<String>,
    #[arg(long, value_name = "TOKEN")]
    end_cut_old: Option<String>,
    #[arg(long, value_name = "COMMAND")]
    end_cut_new: Option<String>,

    #[arg(long, value_name = "FEED")]
    cut_feed: Option<String>,
    #[arg(long, value_name = "FEED")]
    travel_feed: Option<String>,

    /// Number of passes over the tile set.
    #[arg(long, value_name = "N")]
    cycles: Option<String>,
    /// Z increment per pass (mm).
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    cycle_z_offset: Option<String>,

    #[arg(long, value_name = "N")]
    tiles_x: Option<String>,
    #[arg(long, value_name = "N")]
    tiles_y: Option<String>,
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    spacing_x: Option<String>,
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    spacing_y: Option<String>,
    #[arg(long)]
    scale: Option<String>,

    /// File whose contents are placed before the skirts.
    #[arg(long, value_name = "FILE")]
    preamble_file: Option<PathBuf>,
    /// File whose contents run between cycles.
    #[arg(long, value_name = "FILE")]
    subroutine_file: Option<PathBuf>,

    /// Dwell after each skirt (seconds).
    #[arg(long, value_name = "SECONDS")]
    skirt_dwell: Option<String>,
    /// Round emitted numbers to this many decimal places.
    #[arg(long)]
    precision: Option<u32>,
}

impl JobArgs {
    fn into_job_config(self) -> Result<JobConfig> {
        let mut job = match &self.config {
            Some(path) => JobConfig::load_from_file(path)
                .with_context(|| format!("failed to load job file '{}'", path.display()))?,
            None => JobConfig::default(),
        };

        set_text(&mut job.commands.start_cut_old, self.start_cut_old);
        set_text(&mut job.commands.start_cut_new, self.start_cut_new);
        set_text(&mut job.commands.end_cut_old, self.end_cut_old);
        set_text(&mut job.commands.end_cut_new, self.end_cut_new);

        set_number(&mut job.feeds.cut, self.cut_feed);
        set_number(&mut job.feeds.travel, self.travel_feed);
        set_number(&mut job.cycles.count, self.cycles);
        set_number(&mut job.cycles.z_offset, self.cycle_z_offset);
        set_number(&mut job.tiling.count_x, self.tiles_x);
        set_number(&mut job.tiling.count_y, self.tiles_y);
        set_number(&mut job.tiling.spacing_x, self.spacing_x);
        set_number(&mut job.tiling.spacing_y, self.spacing_y);
        set_number(&mut job.tiling.scale, self.scale);
        set_number(&mut job.skirt.dwell_seconds, self.skirt_dwell);

        if let Some(path) = &self.preamble_file {
            job.text.preamble = read_text(path)?;
        }
        if let Some(path) = &self.subroutine_file {
            job.text.subroutine = read_text(path)?;
        }
        if self.precision.is_some() {
            job.output.precision = self.precision;
        }

        Ok(job)
    }

    fn resolve(self) -> Result<PipelineConfig> {
        let job = self.into_job_config()?;
        let resolved = job.resolve().context("invalid job parameters")?;
        Ok(resolved.config)
    }
}

fn set_text(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_number(target: &mut NumberInput, value: Option<String>) {
    if let Some(value) = value {
        *target = NumberInput::Text(value);
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;
    tracing::debug!("plotkit {} (built {})", VERSION, BUILD_DATE);

    match cli.cmd {
        Cmd::Process { input, output, job } => cmd_process(&input, &output, job)?,
        Cmd::Bounds { input, json, job } => cmd_bounds(&input, json, job)?,
        Cmd::Init { path, force } => cmd_init(&path, force)?,
    }

    Ok(())
}

fn cmd_process(input: &Path, output: &Path, job: JobArgs) -> Result<()> {
    let config = job.resolve()?;
    let report = process_file(input, output, &config)
        .with_context(|| format!("failed to process '{}'", input.display()))?;

    let skipped = report.measurement.diagnostics.len();
    if skipped > 0 {
        tracing::warn!("{} line(s) passed through with unreadable fields", skipped);
    }
    Ok(())
}

fn cmd_bounds(input: &Path, json: bool, job: JobArgs) -> Result<()> {
    let config = job.resolve()?;
    let measurement = measure_file(input, &config)
        .with_context(|| format!("failed to measure '{}'", input.display()))?;

    if json {
        let out = serde_json::json!({
            "extent": measurement.extent,
            "work_area": measurement.work_area,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", measurement.work_area);
    }
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("'{}' already exists (use --force to overwrite)", path.display());
    }
    JobConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write job file '{}'", path.display()))?;
    tracing::info!("Wrote default job file to {}", path.display());
    Ok(())
}
