//! Machine code vocabulary
//!
//! The rewriter never interprets G-code beyond a handful of tokens. This
//! module names them so that every stage agrees on what a cut move, a
//! travel move or a dwell looks like.

use serde::{Deserialize, Serialize};

/// Kind of straight-line move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Cutting (pen down) motion
    Cut,
    /// Travel (non-cutting) motion
    Travel,
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cut => write!(f, "cut"),
            Self::Travel => write!(f, "travel"),
        }
    }
}

/// Tokens used to recognise and emit machine commands
///
/// Defaults match the output of common DXF to G-code converters
/// (absolute coordinates, M-codes on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineCodes {
    /// Cutting move code
    pub cut: String,
    /// Travel move code
    pub travel: String,
    /// Set-position code used to zero the Z origin between cycles
    pub coordinate_reset: String,
    /// Dwell code
    pub dwell: String,
    /// End of program code
    pub program_end: String,
    /// Feed field letter
    pub feed_letter: char,
}

impl Default for MachineCodes {
    fn default() -> Self {
        Self {
            cut: "G01".to_string(),
            travel: "G00".to_string(),
            coordinate_reset: "G92".to_string(),
            dwell: "G4".to_string(),
            program_end: "M02".to_string(),
            feed_letter: 'F',
        }
    }
}

impl MachineCodes {
    /// Move code for the given kind
    pub fn move_code(&self, kind: MoveKind) -> &str {
        match kind {
            MoveKind::Cut => &self.cut,
            MoveKind::Travel => &self.travel,
        }
    }

    /// Classify a code word as a move kind
    pub fn classify(&self, word: &str) -> Option<MoveKind> {
        if word == self.cut {
            Some(MoveKind::Cut)
        } else if word == self.travel {
            Some(MoveKind::Travel)
        } else {
            None
        }
    }
}
