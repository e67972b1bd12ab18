//! Whole-token command substitution
//!
//! Converters emit generic start-cut and end-cut M-codes; machines want
//! their own commands (a Z plunge, a fan or relay switch). A token matches
//! only when neither neighbour is a word character, so `M10` never rewrites
//! `M100`. The replacement is inserted literally; `$` is not expanded.

use std::borrow::Cow;

use plotkit_core::{ConfigError, GcodeError};
use regex::{NoExpand, Regex};

use crate::document::ToolpathDocument;
use crate::line::ToolpathLine;
use crate::pipeline::{DocumentStage, StageContext};

/// An (old token, new token) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMapping {
    /// Token to search for
    pub old: String,
    /// Replacement text; may span several lines
    pub new: String,
}

impl CommandMapping {
    /// Create a mapping
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Whether applying the mapping can change anything
    pub fn is_effective(&self) -> bool {
        !self.old.is_empty() && self.old != self.new
    }
}

/// Applies one [`CommandMapping`] across a document
#[derive(Debug, Clone)]
pub struct CommandRewriter {
    mapping: CommandMapping,
    pattern: Option<Regex>,
}

impl CommandRewriter {
    /// Create a new rewriter, compiling the whole-token matcher
    pub fn new(mapping: CommandMapping) -> Result<Self, ConfigError> {
        if mapping.old.is_empty() {
            tracing::warn!("Empty search token; '{}' will not be inserted", mapping.new);
            return Ok(Self {
                mapping,
                pattern: None,
            });
        }

        let source = format!(
            r"\b{{start-half}}{}\b{{end-half}}",
            regex::escape(&mapping.old)
        );
        let pattern = Regex::new(&source).map_err(|e| ConfigError::InvalidPattern {
            token: mapping.old.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            mapping,
            pattern: Some(pattern),
        })
    }

    /// The mapping applied by this rewriter
    pub fn mapping(&self) -> &CommandMapping {
        &self.mapping
    }

    /// Replace every whole-token occurrence in `text`
    ///
    /// Returns `None` when nothing matched.
    pub fn rewrite(&self, text: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        match pattern.replace_all(text, NoExpand(&self.mapping.new)) {
            Cow::Borrowed(_) => None,
            Cow::Owned(rewritten) => Some(rewritten),
        }
    }
}

impl DocumentStage for CommandRewriter {
    fn name(&self) -> &str {
        "command_rewriter"
    }

    fn description(&self) -> &str {
        "Replaces whole-token occurrences of a command with its machine-specific form"
    }

    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let mut lines = Vec::with_capacity(document.len());
        let mut hits = 0usize;

        for (index, line) in document.iter().enumerate() {
            let Some(rewritten) = self.rewrite(line.text()) else {
                lines.push(line.clone());
                continue;
            };

            hits += 1;
            // The replacement may introduce moves or line breaks, so classify again.
            for text in rewritten.split('\n') {
                let text = text.strip_suffix('\r').unwrap_or(text);
                let (line, diagnostic) =
                    ToolpathLine::parse(text, (index + 1) as u32, &context.codes);
                if let Some(diagnostic) = diagnostic {
                    tracing::warn!("Rewritten line passed through unmodified: {}", diagnostic);
                }
                lines.push(line);
            }
        }

        tracing::debug!(
            "Rewrote '{}' -> '{}' on {} line(s)",
            self.mapping.old,
            self.mapping.new,
            hits
        );
        Ok(ToolpathDocument::from_lines(lines))
    }

    fn is_enabled(&self) -> bool {
        self.mapping.is_effective()
    }
}
