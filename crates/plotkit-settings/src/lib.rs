//! PlotKit Settings Crate
//!
//! Handles job files and turns their raw values into validated pipeline
//! parameters.

pub mod config;
pub mod error;

pub use config::{
    CommandSettings, CycleSettings, FeedSettings, JobConfig, NumberInput, OutputSettings,
    ParameterWarning, ResolvedJob, SkirtSettings, TextSettings, TilingSettings,
};
pub use error::{SettingsError, SettingsResult};
