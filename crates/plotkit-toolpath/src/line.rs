//! Toolpath line model
//!
//! A line is either a straight-line move with optional X, Y and feed fields,
//! or opaque text that every stage passes through. Lines are tokenized on
//! whitespace; a word is a field only when its leading letter is X, Y or the
//! feed letter, and scanning stops at the first `;` or `(` comment.
//!
//! Each field remembers the byte span of its value so that rewriting a
//! coordinate leaves the rest of the line untouched.

use std::ops::Range;
use std::sync::OnceLock;

use plotkit_core::GcodeError;
use regex::Regex;

use crate::codes::{MachineCodes, MoveKind};

/// Maximum decimal places honoured by [`NumberFormat`]
const MAX_PRECISION: u32 = 12;

/// Formatting applied to every number the pipeline emits
///
/// With no precision the shortest representation that round-trips is used
/// (`10.0` is written as `10`). With a precision the value is rounded first,
/// which hides artifacts such as `0.30000000000000004`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberFormat {
    /// Decimal places to round to
    pub precision: Option<u32>,
}

impl NumberFormat {
    /// Shortest round-trip formatting
    pub fn shortest() -> Self {
        Self { precision: None }
    }

    /// Round to a fixed number of decimal places before formatting
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision: Some(precision.min(MAX_PRECISION)),
        }
    }

    /// Round a value the way [`NumberFormat::format`] would
    pub fn round(&self, value: f64) -> f64 {
        match self.precision {
            Some(precision) => {
                let multiplier = 10_f64.powi(precision.min(MAX_PRECISION) as i32);
                (value * multiplier).round() / multiplier
            }
            None => value,
        }
    }

    /// Format a value for emission into G-code
    pub fn format(&self, value: f64) -> String {
        let rounded = self.round(value);
        // Never emit "-0"
        if rounded == 0.0 {
            return "0".to_string();
        }
        format!("{}", rounded)
    }
}

/// A numeric field on a move line
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    value: f64,
    span: Range<usize>,
}

impl Field {
    /// Parsed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Byte range of the value text (after the field letter)
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    X,
    Y,
    Feed,
}

/// A straight-line move of a recognised kind
#[derive(Debug, Clone, PartialEq)]
pub struct MoveLine {
    text: String,
    kind: MoveKind,
    x: Option<Field>,
    y: Option<Field>,
    feed: Option<Field>,
}

impl MoveLine {
    /// Original (or rewritten) line text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Move kind
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// X value, if present
    pub fn x(&self) -> Option<f64> {
        self.x.as_ref().map(Field::value)
    }

    /// Y value, if present
    pub fn y(&self) -> Option<f64> {
        self.y.as_ref().map(Field::value)
    }

    /// Feed value, if present
    pub fn feed(&self) -> Option<f64> {
        self.feed.as_ref().map(Field::value)
    }

    /// X field with its span
    pub fn x_field(&self) -> Option<&Field> {
        self.x.as_ref()
    }

    /// Y field with its span
    pub fn y_field(&self) -> Option<&Field> {
        self.y.as_ref()
    }

    /// Feed field with its span
    pub fn feed_field(&self) -> Option<&Field> {
        self.feed.as_ref()
    }

    /// Apply coordinate maps to the X and Y fields that are present
    ///
    /// Fields whose value does not change keep their original text.
    pub fn map_xy<FX, FY>(&self, map_x: FX, map_y: FY, format: NumberFormat) -> MoveLine
    where
        FX: Fn(f64) -> f64,
        FY: Fn(f64) -> f64,
    {
        let x = self.x.as_ref().map(|field| map_x(field.value));
        let y = self.y.as_ref().map(|field| map_y(field.value));
        self.splice(x, y, format)
    }

    /// Append a feed field to the end of the line
    pub fn with_feed(&self, letter: char, value_text: &str, value: f64) -> MoveLine {
        let mut text = self.text.trim_end().to_string();
        text.push(' ');
        text.push(letter);
        let start = text.len();
        text.push_str(value_text);
        let span = start..text.len();

        MoveLine {
            text,
            kind: self.kind,
            x: self.x.clone(),
            y: self.y.clone(),
            feed: Some(Field { value, span }),
        }
    }

    fn splice(&self, x: Option<f64>, y: Option<f64>, format: NumberFormat) -> MoveLine {
        let mut slots: Vec<(Slot, &Field, Option<f64>)> = Vec::with_capacity(3);
        if let Some(field) = &self.x {
            slots.push((Slot::X, field, x));
        }
        if let Some(field) = &self.y {
            slots.push((Slot::Y, field, y));
        }
        if let Some(field) = &self.feed {
            slots.push((Slot::Feed, field, None));
        }
        slots.sort_by_key(|(_, field, _)| field.span.start);

        let mut text = String::with_capacity(self.text.len() + 8);
        let mut cursor = 0;
        let mut result = MoveLine {
            text: String::new(),
            kind: self.kind,
            x: None,
            y: None,
            feed: None,
        };

        for (slot, field, replacement) in slots {
            text.push_str(&self.text[cursor..field.span.start]);
            let start = text.len();
            let value = match replacement {
                Some(value) if value != field.value => {
                    let formatted = format.format(value);
                    text.push_str(&formatted);
                    format.round(value)
                }
                _ => {
                    text.push_str(&self.text[field.span.clone()]);
                    field.value
                }
            };
            let rewritten = Some(Field {
                value,
                span: start..text.len(),
            });
            match slot {
                Slot::X => result.x = rewritten,
                Slot::Y => result.y = rewritten,
                Slot::Feed => result.feed = rewritten,
            }
            cursor = field.span.end;
        }
        text.push_str(&self.text[cursor..]);
        result.text = text;
        result
    }
}

/// One line of a toolpath document
#[derive(Debug, Clone, PartialEq)]
pub enum ToolpathLine {
    /// A recognised straight-line move
    Move(MoveLine),
    /// Anything else: comments, control codes, blank lines, malformed moves
    Other(String),
}

impl ToolpathLine {
    /// Classify a line of text
    ///
    /// Returns the line and, when a field could not be extracted, the
    /// diagnostic explaining why the line is passed through unmodified.
    pub fn parse(
        text: &str,
        line_number: u32,
        codes: &MachineCodes,
    ) -> (ToolpathLine, Option<GcodeError>) {
        let words = words(code_portion(text));
        let Some(kind) = words.iter().find_map(|(_, word)| codes.classify(word)) else {
            return (ToolpathLine::Other(text.to_string()), None);
        };

        let mut x = None;
        let mut y = None;
        let mut feed = None;

        for (offset, word) in &words {
            if codes.classify(word).is_some() {
                continue;
            }
            let Some(letter) = word.chars().next() else {
                continue;
            };
            let slot: &mut Option<Field> = if letter == 'X' {
                &mut x
            } else if letter == 'Y' {
                &mut y
            } else if letter == codes.feed_letter {
                &mut feed
            } else {
                continue;
            };

            let span = offset + letter.len_utf8()..offset + word.len();
            let raw = &text[span.clone()];
            let Some(value) = parse_value(raw) else {
                let error = GcodeError::InvalidParameter {
                    line_number,
                    param: letter.to_string(),
                    reason: format!("'{}' is not a number", raw),
                };
                return (ToolpathLine::Other(text.to_string()), Some(error));
            };
            if slot.is_some() {
                let error = GcodeError::DuplicateParameter {
                    line_number,
                    param: letter.to_string(),
                };
                return (ToolpathLine::Other(text.to_string()), Some(error));
            }
            *slot = Some(Field { value, span });
        }

        let line = MoveLine {
            text: text.to_string(),
            kind,
            x,
            y,
            feed,
        };
        (ToolpathLine::Move(line), None)
    }

    /// Passthrough line
    pub fn other(text: impl Into<String>) -> Self {
        ToolpathLine::Other(text.into())
    }

    /// Line text
    pub fn text(&self) -> &str {
        match self {
            ToolpathLine::Move(line) => line.text(),
            ToolpathLine::Other(text) => text,
        }
    }

    /// Move view of this line
    pub fn as_move(&self) -> Option<&MoveLine> {
        match self {
            ToolpathLine::Move(line) => Some(line),
            ToolpathLine::Other(_) => None,
        }
    }

    /// Whether this line is a move of the given kind
    pub fn is_move_of(&self, kind: MoveKind) -> bool {
        self.as_move().is_some_and(|line| line.kind() == kind)
    }

    /// First code word, ignoring comments
    pub fn first_word(&self) -> Option<&str> {
        let text = self.text();
        words(code_portion(text)).first().map(|(_, word)| *word)
    }
}

/// Text before the first `;` or `(` comment
fn code_portion(text: &str) -> &str {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(]").expect("invalid regex pattern"));
    match regex.find(text) {
        Some(comment) => &text[..comment.start()],
        None => text,
    }
}

fn words(code: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (index, ch) in code.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start.take() {
                words.push((begin, &code[begin..index]));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        words.push((begin, &code[begin..]));
    }
    words
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}
