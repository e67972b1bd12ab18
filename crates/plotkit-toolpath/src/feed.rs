//! Feed-rate annotation

use plotkit_core::GcodeError;

use crate::codes::MoveKind;
use crate::document::ToolpathDocument;
use crate::line::ToolpathLine;
use crate::pipeline::{DocumentStage, StageContext};

/// Appends a feed field to moves of one kind that have none
///
/// A line is left alone when the feed letter appears anywhere in its text,
/// including inside a trailing comment.
#[derive(Debug, Clone)]
pub struct FeedAnnotator {
    kind: MoveKind,
    feed: f64,
}

impl FeedAnnotator {
    /// Create a new feed annotator
    pub fn new(kind: MoveKind, feed: f64) -> Self {
        Self { kind, feed }
    }

    /// Move kind this annotator targets
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Feed value appended to matching lines
    pub fn feed(&self) -> f64 {
        self.feed
    }
}

impl DocumentStage for FeedAnnotator {
    fn name(&self) -> &str {
        match self.kind {
            MoveKind::Cut => "cut_feed_annotator",
            MoveKind::Travel => "travel_feed_annotator",
        }
    }

    fn description(&self) -> &str {
        "Appends a feed rate to move lines that lack one"
    }

    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let letter = context.codes.feed_letter;
        let value_text = context.format.format(self.feed);
        let value = context.format.round(self.feed);
        let mut annotated = 0usize;

        let out = document
            .iter()
            .map(|line| match line {
                ToolpathLine::Move(line)
                    if line.kind() == self.kind && !line.text().contains(letter) =>
                {
                    annotated += 1;
                    ToolpathLine::Move(line.with_feed(letter, &value_text, value))
                }
                other => other.clone(),
            })
            .collect();

        tracing::debug!(
            "Added {}{} to {} {} move(s)",
            letter,
            value_text,
            annotated,
            self.kind
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::MachineCodes;

    fn annotate(text: &str, kind: MoveKind, feed: f64) -> String {
        let document = ToolpathDocument::parse(text, &MachineCodes::default()).document;
        FeedAnnotator::new(kind, feed)
            .apply(&document, &StageContext::default())
            .unwrap()
            .to_text()
    }

    #[test]
    fn test_appends_missing_feed() {
        assert_eq!(annotate("G01 X1", MoveKind::Cut, 4500.0), "G01 X1 F4500\n");
    }

    #[test]
    fn test_existing_feed_is_kept() {
        assert_eq!(
            annotate("G01 X1 F200", MoveKind::Cut, 4500.0),
            "G01 X1 F200\n"
        );
    }

    #[test]
    fn test_feed_letter_anywhere_disables_annotation() {
        assert_eq!(
            annotate("G01 X1 ; Fast corner", MoveKind::Cut, 4500.0),
            "G01 X1 ; Fast corner\n"
        );
    }

    #[test]
    fn test_only_target_kind_is_annotated() {
        assert_eq!(
            annotate("G00 X0\nG01 X1\nM09", MoveKind::Travel, 9000.0),
            "G00 X0 F9000\nG01 X1\nM09\n"
        );
    }
}
