//! # PlotKit Toolpath
//!
//! Line model and rewrite stages for pen-plotter G-code.
//! Takes a unit-cell toolpath and produces a tiled, multi-pass program
//! with outline skirts and machine-specific cut commands.

pub mod bounds;
pub mod codes;
pub mod cycles;
pub mod document;
pub mod feed;
pub mod job;
pub mod line;
pub mod pipeline;
pub mod program_end;
pub mod rewrite;
pub mod skirt;
pub mod tiling;

pub use bounds::{BoundingExtent, BoundsCalculator, WorkArea};
pub use codes::{MachineCodes, MoveKind};
pub use cycles::{CycleRepeater, CycleSpec};
pub use document::{ParsedDocument, ToolpathDocument};
pub use feed::FeedAnnotator;
pub use job::{JobOutput, Measurement, PipelineConfig, RunReport, ToolpathJob};
pub use line::{Field, MoveLine, NumberFormat, ToolpathLine};
pub use pipeline::{DocumentStage, StageContext, StageHandle, StagePipeline};
pub use program_end::{ProgramEndAppender, ProgramEndStripper};
pub use rewrite::{CommandMapping, CommandRewriter};
pub use skirt::Skirt;
pub use tiling::{CellOffsetter, TilingSpec};
