//! End-of-program handling
//!
//! The unit cell ends with its own end-of-program code, which must not be
//! repeated inside the tiled body. It is stripped before tiling and a single
//! marker is appended after the last cycle.

use plotkit_core::GcodeError;

use crate::document::ToolpathDocument;
use crate::line::ToolpathLine;
use crate::pipeline::{DocumentStage, StageContext};

/// Removes lines whose first code word is the end-of-program code
#[derive(Debug, Clone, Default)]
pub struct ProgramEndStripper;

impl ProgramEndStripper {
    /// Create a new stripper
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStage for ProgramEndStripper {
    fn name(&self) -> &str {
        "program_end_stripper"
    }

    fn description(&self) -> &str {
        "Removes end-of-program lines from the unit cell"
    }

    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let marker = context.codes.program_end.as_str();
        let kept: ToolpathDocument = document
            .iter()
            .filter(|line| line.first_word() != Some(marker))
            .cloned()
            .collect();

        let removed = document.len() - kept.len();
        if removed > 0 {
            tracing::debug!("Stripped {} '{}' line(s)", removed, marker);
        }
        Ok(kept)
    }
}

/// Appends a single end-of-program line
#[derive(Debug, Clone, Default)]
pub struct ProgramEndAppender;

impl ProgramEndAppender {
    /// Create a new appender
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStage for ProgramEndAppender {
    fn name(&self) -> &str {
        "program_end_appender"
    }

    fn description(&self) -> &str {
        "Terminates the program with the end-of-program code"
    }

    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let mut lines = document.lines().to_vec();
        lines.push(ToolpathLine::other(context.codes.program_end.clone()));
        Ok(ToolpathDocument::from_lines(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::MachineCodes;

    #[test]
    fn test_strip_and_append() {
        let codes = MachineCodes::default();
        let document = ToolpathDocument::parse("G00 X0 Y0\nM02\nM02 ; done\n; M02", &codes).document;
        let context = StageContext::default();

        let stripped = ProgramEndStripper::new().apply(&document, &context).unwrap();
        assert_eq!(stripped.to_text(), "G00 X0 Y0\n; M02\n");

        let terminated = ProgramEndAppender::new().apply(&stripped, &context).unwrap();
        assert_eq!(terminated.to_text(), "G00 X0 Y0\n; M02\nM02\n");
    }
}
