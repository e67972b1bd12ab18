//! Toolpath documents
//!
//! A document is an ordered list of classified lines. Order is execution
//! order; every stage consumes one document and returns a new one.

use plotkit_core::GcodeError;

use crate::codes::{MachineCodes, MoveKind};
use crate::line::ToolpathLine;

/// Ordered, immutable sequence of toolpath lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolpathDocument {
    lines: Vec<ToolpathLine>,
}

/// Result of parsing text into a document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The classified document
    pub document: ToolpathDocument,
    /// Field extraction problems; the affected lines pass through unmodified
    pub diagnostics: Vec<GcodeError>,
}

impl ToolpathDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text into a document
    ///
    /// Line endings are `\n` or `\r\n`; a trailing newline does not produce
    /// an extra empty line.
    pub fn parse(text: &str, codes: &MachineCodes) -> ParsedDocument {
        let mut lines = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let (line, diagnostic) = ToolpathLine::parse(raw, (index + 1) as u32, codes);
            if let Some(diagnostic) = diagnostic {
                tracing::warn!("Passing line {} through unmodified: {}", index + 1, diagnostic);
                diagnostics.push(diagnostic);
            }
            lines.push(line);
        }

        ParsedDocument {
            document: Self { lines },
            diagnostics,
        }
    }

    /// Build a document from already classified lines
    pub fn from_lines(lines: Vec<ToolpathLine>) -> Self {
        Self { lines }
    }

    /// Concatenate documents in order
    pub fn concat<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a ToolpathDocument>,
    {
        let lines = documents
            .into_iter()
            .flat_map(|document| document.lines.iter().cloned())
            .collect();
        Self { lines }
    }

    /// All lines
    pub fn lines(&self) -> &[ToolpathLine] {
        &self.lines
    }

    /// Iterate over lines
    pub fn iter(&self) -> std::slice::Iter<'_, ToolpathLine> {
        self.lines.iter()
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of move lines of a kind
    pub fn count_moves(&self, kind: MoveKind) -> usize {
        self.lines.iter().filter(|line| line.is_move_of(kind)).count()
    }

    /// Render as text, each line newline-terminated
    pub fn to_text(&self) -> String {
        let capacity = self.lines.iter().map(|line| line.text().len() + 1).sum();
        let mut text = String::with_capacity(capacity);
        for line in &self.lines {
            text.push_str(line.text());
            text.push('\n');
        }
        text
    }
}

impl<'a> IntoIterator for &'a ToolpathDocument {
    type Item = &'a ToolpathLine;
    type IntoIter = std::slice::Iter<'a, ToolpathLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl FromIterator<ToolpathLine> for ToolpathDocument {
    fn from_iter<T: IntoIterator<Item = ToolpathLine>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}
