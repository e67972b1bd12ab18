//! Error types for the settings crate.
//!
//! Covers reading and writing job files and rejecting their contents.

use std::io;

use plotkit_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while loading, saving or resolving a job file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// A configuration validation error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;
