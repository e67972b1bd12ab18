//! Error handling for PlotKit
//!
//! Provides the error types used by every layer of the toolpath rewriter:
//! - G-code errors (field extraction and pipeline stages)
//! - Configuration errors (job files, run parameters)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-code error type
///
/// Represents errors raised while reading or transforming a toolpath.
/// Field-level variants are recoverable and are collected as diagnostics;
/// stage-level variants abort the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A field letter was followed by text that is not a decimal number
    #[error("Invalid parameter '{param}' at line {line_number}: {reason}")]
    InvalidParameter {
        /// The line number where the invalid parameter was found.
        line_number: u32,
        /// The field letter.
        param: String,
        /// The reason the parameter is invalid.
        reason: String,
    },

    /// The same field appears twice on one move line
    #[error("Duplicate parameter '{param}' at line {line_number}")]
    DuplicateParameter {
        /// The line number where the duplicate was found.
        line_number: u32,
        /// The field letter.
        param: String,
    },

    /// The input document contains no lines at all
    #[error("Input toolpath is empty")]
    EmptyInput,

    /// A pipeline stage could not produce a document
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed {
        /// The name of the failing stage.
        stage: String,
        /// The reason for the failure.
        reason: String,
    },
}

impl GcodeError {
    /// Line number the error refers to, when it is a field-level error
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Self::InvalidParameter { line_number, .. }
            | Self::DuplicateParameter { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}

/// Configuration error type
///
/// Raised before any transformation begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required path-like parameter was not supplied
    #[error("Missing required path: {0}")]
    MissingPath(String),

    /// A parameter is outside its valid range
    #[error("Value out of range for '{key}': {value} (expected {expected})")]
    ValueOutOfRange {
        /// The parameter name.
        key: String,
        /// The offending value as text.
        value: String,
        /// Human readable description of the valid range.
        expected: String,
    },

    /// The job file format is not supported
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A search token could not be compiled into a matcher
    #[error("Invalid search token '{token}': {reason}")]
    InvalidPattern {
        /// The token as supplied.
        token: String,
        /// Why the matcher could not be built.
        reason: String,
    },
}

/// Main error type for PlotKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
