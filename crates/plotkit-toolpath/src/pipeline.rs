//! Document stage pipeline
//!
//! Every transformation is a [`DocumentStage`]: it reads one whole document
//! and returns a new one. A [`StagePipeline`] applies registered stages in
//! order and stops at the first failure.

use plotkit_core::GcodeError;

use crate::codes::MachineCodes;
use crate::document::ToolpathDocument;
use crate::line::NumberFormat;

/// Run-wide settings visible to every stage
#[derive(Debug, Clone, Default)]
pub struct StageContext {
    /// Token vocabulary
    pub codes: MachineCodes,
    /// Formatting for emitted numbers
    pub format: NumberFormat,
}

impl StageContext {
    /// Create a stage context
    pub fn new(codes: MachineCodes, format: NumberFormat) -> Self {
        Self { codes, format }
    }
}

/// Trait for whole-document transformations
///
/// Stages never mutate their input; they build a new document. Returning an
/// error aborts the pipeline.
pub trait DocumentStage: Send + Sync {
    /// Get the name/identifier of this stage
    fn name(&self) -> &str;

    /// Get a description of what this stage does
    fn description(&self) -> &str;

    /// Transform a document
    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError>;

    /// Check if this stage is enabled
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Boxed stage
pub type StageHandle = Box<dyn DocumentStage>;

/// Ordered sequence of document stages
///
/// # Example
/// ```ignore
/// let mut pipeline = StagePipeline::new();
/// pipeline.register(Box::new(CommandRewriter::new(start_cut)?));
/// pipeline.register(Box::new(FeedAnnotator::new(MoveKind::Cut, 4500.0)));
///
/// let output = pipeline.run(&document, &context)?;
/// ```
#[derive(Default)]
pub struct StagePipeline {
    stages: Vec<StageHandle>,
}

impl StagePipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Register a stage; stages run in registration order
    pub fn register(&mut self, stage: StageHandle) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Get the number of registered stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// List all registered stages as (name, description, enabled)
    pub fn list_stages(&self) -> Vec<(&str, &str, bool)> {
        self.stages
            .iter()
            .map(|s| (s.name(), s.description(), s.is_enabled()))
            .collect()
    }

    /// Run the document through every enabled stage
    pub fn run(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let mut current = document.clone();

        for stage in &self.stages {
            if !stage.is_enabled() {
                tracing::debug!("Skipping disabled stage '{}'", stage.name());
                continue;
            }

            current = match stage.apply(&current, context) {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!("Stage '{}' failed: {}", stage.name(), e);
                    return Err(e);
                }
            };
            tracing::debug!("Stage '{}' produced {} lines", stage.name(), current.len());
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::ToolpathLine;

    struct Append(&'static str);

    impl DocumentStage for Append {
        fn name(&self) -> &str {
            "append"
        }

        fn description(&self) -> &str {
            "Appends a fixed line"
        }

        fn apply(
            &self,
            document: &ToolpathDocument,
            _context: &StageContext,
        ) -> Result<ToolpathDocument, GcodeError> {
            let mut lines = document.lines().to_vec();
            lines.push(ToolpathLine::other(self.0));
            Ok(ToolpathDocument::from_lines(lines))
        }
    }

    struct Fail;

    impl DocumentStage for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn apply(
            &self,
            _document: &ToolpathDocument,
            _context: &StageContext,
        ) -> Result<ToolpathDocument, GcodeError> {
            Err(GcodeError::StageFailed {
                stage: "fail".to_string(),
                reason: "always".to_string(),
            })
        }
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut pipeline = StagePipeline::new();
        pipeline
            .register(Box::new(Append("first")))
            .register(Box::new(Append("second")));
        assert_eq!(pipeline.stage_count(), 2);

        let out = pipeline
            .run(&ToolpathDocument::new(), &StageContext::default())
            .unwrap();
        assert_eq!(out.to_text(), "first\nsecond\n");
    }

    #[test]
    fn test_failure_aborts_pipeline() {
        let mut pipeline = StagePipeline::new();
        pipeline
            .register(Box::new(Append("first")))
            .register(Box::new(Fail))
            .register(Box::new(Append("never")));

        let result = pipeline.run(&ToolpathDocument::new(), &StageContext::default());
        assert!(matches!(result, Err(GcodeError::StageFailed { .. })));
    }
}
