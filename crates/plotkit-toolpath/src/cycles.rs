//! Multi-cycle repetition
//!
//! A cycle is one full pass over the tile set. Between passes the tool is
//! lifted to the pass's Z offset, the Z origin is reset there, and a
//! user-supplied subroutine runs (for example to turn a page).

use plotkit_core::{ConfigError, GcodeError};

use crate::document::ToolpathDocument;
use crate::line::ToolpathLine;
use crate::pipeline::{DocumentStage, StageContext};
use crate::tiling::out_of_range;

/// Cycle parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSpec {
    /// Number of passes
    pub count: u32,
    /// Z increment per pass (mm)
    pub z_offset: f64,
    /// Text inserted verbatim between passes
    pub subroutine: String,
}

impl CycleSpec {
    /// Create new cycle parameters
    pub fn new(count: u32, z_offset: f64, subroutine: impl Into<String>) -> Self {
        Self {
            count,
            z_offset,
            subroutine: subroutine.into(),
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.z_offset.is_finite() {
            return Err(out_of_range("cycles.z_offset", self.z_offset, "a finite number"));
        }
        Ok(())
    }

    /// Number of passes emitted; a count of zero still emits the tile set once
    pub fn passes(&self) -> u32 {
        self.count.max(1)
    }

    /// Z value used for the lift after pass `index`
    pub fn lift_z(&self, index: u32) -> f64 {
        index as f64 * self.z_offset
    }
}

impl Default for CycleSpec {
    fn default() -> Self {
        Self::new(1, 0.0, "")
    }
}

/// Concatenates `count` copies of the tile set with transition blocks
#[derive(Debug, Clone)]
pub struct CycleRepeater {
    spec: CycleSpec,
}

impl CycleRepeater {
    /// Create a new cycle repeater
    pub fn new(spec: CycleSpec) -> Self {
        Self { spec }
    }

    /// Cycle parameters
    pub fn spec(&self) -> &CycleSpec {
        &self.spec
    }

    /// Lines inserted between pass `index` and pass `index + 1`
    pub fn transition(&self, index: u32, context: &StageContext) -> Vec<ToolpathLine> {
        let codes = &context.codes;
        let lift = format!(
            "{} Z{}",
            codes.cut,
            context.format.format(self.spec.lift_z(index))
        );
        let reset = format!("{} Z0", codes.coordinate_reset);

        let mut lines = Vec::new();
        for text in [lift.as_str(), reset.as_str()]
            .into_iter()
            .chain(self.spec.subroutine.lines())
        {
            let (line, diagnostic) = ToolpathLine::parse(text, 0, codes);
            if let Some(diagnostic) = diagnostic {
                tracing::warn!("Subroutine line passed through unmodified: {}", diagnostic);
            }
            lines.push(line);
        }
        lines
    }
}

impl DocumentStage for CycleRepeater {
    fn name(&self) -> &str {
        "cycle_repeater"
    }

    fn description(&self) -> &str {
        "Repeats the tile set once per cycle with Z lift, origin reset and subroutine"
    }

    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let passes = self.spec.passes();
        let failed = |reason: String| GcodeError::StageFailed {
            stage: self.name().to_string(),
            reason,
        };

        let total = document.len().checked_mul(passes as usize).ok_or_else(|| {
            failed(format!(
                "{} passes over {} lines overflow",
                passes,
                document.len()
            ))
        })?;
        let mut lines: Vec<ToolpathLine> = Vec::new();
        lines
            .try_reserve(total)
            .map_err(|e| failed(format!("cannot hold {} lines: {}", total, e)))?;

        lines.extend(document.iter().cloned());
        for index in 0..passes - 1 {
            lines.extend(self.transition(index, context));
            lines.extend(document.iter().cloned());
        }

        tracing::debug!("Repeated tile set {} times", passes);
        Ok(ToolpathDocument::from_lines(lines))
    }
}
