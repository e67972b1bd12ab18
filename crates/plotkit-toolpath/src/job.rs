//! Toolpath job driver
//!
//! Composes the stages into the final program:
//!
//! 1. strip the unit cell's end-of-program code
//! 2. tile the cell
//! 3. measure the unit cell for the part and work-area skirts
//! 4. repeat the tile set per cycle and terminate the program
//! 5. build the part and work-area skirts
//! 6. prepend preamble and skirts to the body
//! 7. rewrite the start-cut and end-cut commands
//! 8. annotate cut and travel feeds
//!
//! The whole document is built in memory; callers receive either the
//! complete text or an error.

use plotkit_core::{ConfigError, GcodeError};

use crate::bounds::{BoundingExtent, BoundsCalculator, WorkArea};
use crate::codes::{MachineCodes, MoveKind};
use crate::cycles::{CycleRepeater, CycleSpec};
use crate::document::ToolpathDocument;
use crate::feed::FeedAnnotator;
use crate::line::NumberFormat;
use crate::pipeline::{StageContext, StagePipeline};
use crate::program_end::{ProgramEndAppender, ProgramEndStripper};
use crate::rewrite::{CommandMapping, CommandRewriter};
use crate::skirt::Skirt;
use crate::tiling::{out_of_range, CellOffsetter, TilingSpec};

/// Immutable parameters for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Token vocabulary
    pub codes: MachineCodes,
    /// Tile grid
    pub tiling: TilingSpec,
    /// Cycle repetition
    pub cycles: CycleSpec,
    /// Start-cut command mapping
    pub start_cut: CommandMapping,
    /// End-cut command mapping
    pub end_cut: CommandMapping,
    /// Feed for cut moves
    pub cut_feed: f64,
    /// Feed for travel moves
    pub travel_feed: f64,
    /// Text placed before everything else
    pub preamble: String,
    /// Dwell after each skirt (seconds)
    pub skirt_dwell_seconds: f64,
    /// Formatting for emitted numbers
    pub format: NumberFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            codes: MachineCodes::default(),
            tiling: TilingSpec::default(),
            cycles: CycleSpec::default(),
            start_cut: CommandMapping::new("M09", "G01 Z-3"),
            end_cut: CommandMapping::new("M10", "G01 Z0"),
            cut_feed: 4500.0,
            travel_feed: 9000.0,
            preamble: String::new(),
            skirt_dwell_seconds: 2.0,
            format: NumberFormat::shortest(),
        }
    }
}

impl PipelineConfig {
    /// Validate every parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tiling.validate()?;
        self.cycles.validate()?;

        if self.codes.cut.trim().is_empty() {
            return Err(out_of_range("codes.cut", "", "a non-empty code"));
        }
        if self.codes.travel.trim().is_empty() {
            return Err(out_of_range("codes.travel", "", "a non-empty code"));
        }
        if self.codes.cut == self.codes.travel {
            return Err(out_of_range(
                "codes.travel",
                &self.codes.travel,
                "a code different from codes.cut",
            ));
        }
        if !self.cut_feed.is_finite() {
            return Err(out_of_range("feeds.cut", self.cut_feed, "a finite number"));
        }
        if !self.travel_feed.is_finite() {
            return Err(out_of_range("feeds.travel", self.travel_feed, "a finite number"));
        }
        if !(self.skirt_dwell_seconds.is_finite() && self.skirt_dwell_seconds >= 0.0) {
            return Err(out_of_range(
                "skirt.dwell_seconds",
                self.skirt_dwell_seconds,
                ">= 0",
            ));
        }
        Ok(())
    }
}

/// Unit-cell measurements
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Extent of the unit cell
    pub extent: BoundingExtent,
    /// Part and work-area dimensions
    pub work_area: WorkArea,
    /// Field extraction problems found in the input
    pub diagnostics: Vec<GcodeError>,
    /// Number of input lines
    pub input_lines: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Unit-cell measurements
    pub measurement: Measurement,
    /// Number of output lines
    pub output_lines: usize,
    /// Number of tiles per cycle
    pub tiles: u64,
    /// Number of cycles
    pub cycles: u32,
}

/// Output of a completed run
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// Final program text, every line newline-terminated
    pub text: String,
    /// Run summary
    pub report: RunReport,
}

/// Rewrites a unit-cell toolpath into the final machine program
#[derive(Debug, Clone)]
pub struct ToolpathJob {
    config: PipelineConfig,
    context: StageContext,
    start_cut: CommandRewriter,
    end_cut: CommandRewriter,
}

impl ToolpathJob {
    /// Create a job after validating its parameters
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let context = StageContext::new(config.codes.clone(), config.format);
        let start_cut = CommandRewriter::new(config.start_cut.clone())?;
        let end_cut = CommandRewriter::new(config.end_cut.clone())?;
        Ok(Self {
            config,
            context,
            start_cut,
            end_cut,
        })
    }

    /// Job parameters
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse the unit cell and measure its extents
    pub fn measure(&self, input: &str) -> Result<Measurement, GcodeError> {
        let (_, measurement) = self.parse_and_measure(input)?;
        Ok(measurement)
    }

    /// Run the full pipeline
    pub fn run(&self, input: &str) -> Result<JobOutput, GcodeError> {
        let (cell, measurement) = self.parse_and_measure(input)?;
        let work_area = measurement.work_area;
        tracing::info!(
            "Part bounds {} x {} mm, work bounds {} x {} mm",
            work_area.part_width,
            work_area.part_height,
            work_area.work_width,
            work_area.work_height
        );

        let body = self.body_pipeline().run(&cell, &self.context)?;

        let dwell = self.config.skirt_dwell_seconds;
        let part_skirt = Skirt::new(work_area.part_width, work_area.part_height, dwell)
            .to_document(&self.context);
        let work_skirt = Skirt::new(work_area.work_width, work_area.work_height, dwell)
            .to_document(&self.context);
        let preamble = ToolpathDocument::parse(&self.config.preamble, &self.context.codes);

        let assembled =
            ToolpathDocument::concat([&preamble.document, &part_skirt, &work_skirt, &body]);
        let finished = self.finishing_pipeline().run(&assembled, &self.context)?;

        let report = RunReport {
            output_lines: finished.len(),
            tiles: self.config.tiling.total_tiles(),
            cycles: self.config.cycles.passes(),
            measurement,
        };
        tracing::info!(
            "Produced {} lines ({} cut, {} travel moves)",
            finished.len(),
            finished.count_moves(MoveKind::Cut),
            finished.count_moves(MoveKind::Travel)
        );

        Ok(JobOutput {
            text: finished.to_text(),
            report,
        })
    }

    fn parse_and_measure(
        &self,
        input: &str,
    ) -> Result<(ToolpathDocument, Measurement), GcodeError> {
        let parsed = ToolpathDocument::parse(input, &self.context.codes);
        if parsed.document.is_empty() {
            return Err(GcodeError::EmptyInput);
        }

        let extent = BoundsCalculator::calculate(&parsed.document);
        let measurement = Measurement {
            extent,
            work_area: WorkArea::new(&extent, &self.config.tiling),
            diagnostics: parsed.diagnostics,
            input_lines: parsed.document.len(),
        };
        Ok((parsed.document, measurement))
    }

    /// Strip, tile, cycle and terminate the unit cell
    pub fn body_pipeline(&self) -> StagePipeline {
        let mut pipeline = StagePipeline::new();
        pipeline
            .register(Box::new(ProgramEndStripper::new()))
            .register(Box::new(CellOffsetter::new(self.config.tiling.clone())))
            .register(Box::new(CycleRepeater::new(self.config.cycles.clone())))
            .register(Box::new(ProgramEndAppender::new()));
        pipeline
    }

    /// Rewrite commands and annotate feeds on the assembled program
    pub fn finishing_pipeline(&self) -> StagePipeline {
        let mut pipeline = StagePipeline::new();
        pipeline
            .register(Box::new(self.start_cut.clone()))
            .register(Box::new(self.end_cut.clone()))
            .register(Box::new(FeedAnnotator::new(
                MoveKind::Cut,
                self.config.cut_feed,
            )))
            .register(Box::new(FeedAnnotator::new(
                MoveKind::Travel,
                self.config.travel_feed,
            )));
        pipeline
    }
}
