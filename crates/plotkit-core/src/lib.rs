//! # PlotKit Core
//!
//! Error types shared by the toolpath, settings and CLI crates.

pub mod error;

pub use error::{ConfigError, Error, GcodeError, Result};
