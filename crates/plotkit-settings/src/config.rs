//! Job configuration for PlotKit
//!
//! A job file holds every run parameter, organized into sections:
//! - Command mappings (start-cut and end-cut tokens)
//! - Feed rates
//! - Cycle repetition
//! - Tiling grid
//! - Preamble and subroutine text
//! - Machine codes
//! - Skirt and output formatting
//!
//! Files are JSON or TOML, chosen by extension. Numeric values may be
//! written as numbers or as text; text that does not parse resolves to zero
//! and is reported as a [`ParameterWarning`].

use std::path::Path;

use plotkit_core::ConfigError;
use plotkit_toolpath::{
    CommandMapping, CycleSpec, MachineCodes, NumberFormat, PipelineConfig, TilingSpec,
};
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

const DEFAULT_PREAMBLE: &str = "\
M201 X1000 Y1000 Z1000 E5000 ; sets maximum accelerations, mm/sec^2
M203 X400 Y400 Z48 E120 ; sets maximum feedrates, mm / sec
M204 S400 T1250 ; sets acceleration (S) and retract acceleration (R), mm/sec^2
M205 X8.00 Y8.00 Z0.40 E1.50 ; sets the jerk limits, mm/sec
M205 S0 T0 ; sets the minimum extruding and travel feed rate, mm/sec

;TYPE:Custom
; Initial setups
G90 ; use absolute coordinates
G92 ; reset coordinates to 0
G01 Z-3 F100
G01 Z0 F100
G4 S2
;
;";

const DEFAULT_SUBROUTINE: &str = "\
;;;;;;;;;;;;;;;;;;;;;;;
G01 Z0
G4 S2
G01 X100 Y-10
M106 S255
G01 Z-3 F500
G4 S3
G01 Z20 F250
G00 Y200 Z200
M107
G00 X0 Y-10 Z0
G00 Z-3
G01 X100
G01 Z0
G00 X0 Y0
;;;;;;;;;;;;;;;;;;;;;;;;;;;";

/// A numeric parameter as written by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    /// Native number
    Number(f64),
    /// Text to be parsed at resolution time
    Text(String),
}

impl NumberInput {
    /// Parsed value, `None` when the input is not a finite number
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite()),
        }
    }
}

impl Default for NumberInput {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for NumberInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumberInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for NumberInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl std::fmt::Display for NumberInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Start-cut and end-cut command mappings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    /// Start-cut token emitted by the converter
    pub start_cut_old: String,
    /// Machine-specific start-cut command
    pub start_cut_new: String,
    /// End-cut token emitted by the converter
    pub end_cut_old: String,
    /// Machine-specific end-cut command
    pub end_cut_new: String,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            start_cut_old: "M09".to_string(),
            start_cut_new: "G01 Z-3".to_string(),
            end_cut_old: "M10".to_string(),
            end_cut_new: "G01 Z0".to_string(),
        }
    }
}

/// Feed rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Feed for cut moves
    pub cut: NumberInput,
    /// Feed for travel moves
    pub travel: NumberInput,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            cut: NumberInput::Number(4500.0),
            travel: NumberInput::Number(9000.0),
        }
    }
}

/// Cycle repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleSettings {
    /// Number of passes
    pub count: NumberInput,
    /// Z increment per pass (mm)
    pub z_offset: NumberInput,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            count: NumberInput::Number(2.0),
            z_offset: NumberInput::Number(-0.086),
        }
    }
}

/// Tiling grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingSettings {
    /// Tiles along X
    pub count_x: NumberInput,
    /// Tiles along Y
    pub count_y: NumberInput,
    /// Step between tiles along X (mm)
    pub spacing_x: NumberInput,
    /// Step between tiles along Y (mm)
    pub spacing_y: NumberInput,
    /// Uniform coordinate multiplier
    pub scale: NumberInput,
}

impl Default for TilingSettings {
    fn default() -> Self {
        Self {
            count_x: NumberInput::Number(1.0),
            count_y: NumberInput::Number(1.0),
            spacing_x: NumberInput::Number(10.0),
            spacing_y: NumberInput::Number(10.0),
            scale: NumberInput::Number(1.0),
        }
    }
}

/// Free text blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// Placed before the skirts
    pub preamble: String,
    /// Inserted between cycles
    pub subroutine: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            subroutine: DEFAULT_SUBROUTINE.to_string(),
        }
    }
}

/// Skirt settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirtSettings {
    /// Dwell after each skirt (seconds)
    pub dwell_seconds: NumberInput,
}

impl Default for SkirtSettings {
    fn default() -> Self {
        Self {
            dwell_seconds: NumberInput::Number(2.0),
        }
    }
}

/// Output formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Decimal places for emitted numbers; shortest form when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

/// Complete job configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Command mappings
    pub commands: CommandSettings,
    /// Feed rates
    pub feeds: FeedSettings,
    /// Cycle repetition
    pub cycles: CycleSettings,
    /// Tiling grid
    pub tiling: TilingSettings,
    /// Preamble and subroutine
    pub text: TextSettings,
    /// Machine codes
    pub codes: MachineCodes,
    /// Skirt settings
    pub skirt: SkirtSettings,
    /// Output formatting
    pub output: OutputSettings,
}

/// A numeric parameter that did not parse and was replaced by zero
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterWarning {
    /// Job-file key of the parameter
    pub field: String,
    /// Text as supplied
    pub value: String,
}

impl std::fmt::Display for ParameterWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a number for {}; using 0",
            self.value, self.field
        )
    }
}

/// Validated pipeline parameters plus the warnings raised while resolving
#[derive(Debug, Clone)]
pub struct ResolvedJob {
    /// Parameters for the pipeline
    pub config: PipelineConfig,
    /// Parameters that fell back to zero
    pub warnings: Vec<ParameterWarning>,
}

impl JobConfig {
    /// Load a job file (JSON or TOML)
    ///
    /// Values are checked when the job is resolved, after any overrides
    /// have been applied.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(unsupported(path));
        };

        tracing::debug!("Loaded job file {}", path.display());
        Ok(config)
    }

    /// Save the job file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.resolve()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(unsupported(path));
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parse every numeric parameter and validate the result
    ///
    /// Unparseable numbers become zero, are reported, and the run goes on
    /// with that zero. Range rules apply only to values that parsed.
    pub fn resolve(&self) -> Result<ResolvedJob, ConfigError> {
        let mut warnings = Vec::new();
        let mut number = |field: &str, input: &NumberInput| -> f64 {
            input.value().unwrap_or_else(|| {
                let warning = ParameterWarning {
                    field: field.to_string(),
                    value: input.to_string(),
                };
                tracing::warn!("{}", warning);
                warnings.push(warning);
                0.0
            })
        };

        let cut_feed = number("feeds.cut", &self.feeds.cut);
        let travel_feed = number("feeds.travel", &self.feeds.travel);
        let cycle_count = number("cycles.count", &self.cycles.count);
        let z_offset = number("cycles.z_offset", &self.cycles.z_offset);
        let count_x = number("tiling.count_x", &self.tiling.count_x);
        let spacing_x = number("tiling.spacing_x", &self.tiling.spacing_x);
        let count_y = number("tiling.count_y", &self.tiling.count_y);
        let spacing_y = number("tiling.spacing_y", &self.tiling.spacing_y);
        let scale = number("tiling.scale", &self.tiling.scale);
        let dwell_seconds = number("skirt.dwell_seconds", &self.skirt.dwell_seconds);

        let parsed = |field: &str| !warnings.iter().any(|warning| warning.field == field);
        let count = |field: &str, value: f64| -> Result<u32, ConfigError> {
            let count = to_count(field, value)?;
            if count == 0 && parsed(field) {
                return Err(out_of_range(field, value, ">= 1"));
            }
            Ok(count)
        };

        let count_x = count("tiling.count_x", count_x)?;
        let count_y = count("tiling.count_y", count_y)?;
        let cycle_count = count("cycles.count", cycle_count)?;
        if scale <= 0.0 && parsed("tiling.scale") {
            return Err(out_of_range("tiling.scale", scale, "> 0"));
        }

        let format = match self.output.precision {
            Some(precision) => NumberFormat::with_precision(precision),
            None => NumberFormat::shortest(),
        };

        let config = PipelineConfig {
            codes: self.codes.clone(),
            tiling: TilingSpec::new(count_x, count_y, spacing_x, spacing_y, scale),
            cycles: CycleSpec::new(cycle_count, z_offset, self.text.subroutine.trim()),
            start_cut: CommandMapping::new(
                &self.commands.start_cut_old,
                &self.commands.start_cut_new,
            ),
            end_cut: CommandMapping::new(&self.commands.end_cut_old, &self.commands.end_cut_new),
            cut_feed,
            travel_feed,
            preamble: self.text.preamble.trim().to_string(),
            skirt_dwell_seconds: dwell_seconds,
            format,
        };
        config.validate()?;

        Ok(ResolvedJob { config, warnings })
    }
}

/// Counts are truncated toward zero
fn to_count(key: &str, value: f64) -> Result<u32, ConfigError> {
    let count = value.trunc();
    if !(0.0..=u32::MAX as f64).contains(&count) {
        return Err(out_of_range(key, value, ">= 1"));
    }
    Ok(count as u32)
}

fn out_of_range(key: &str, value: f64, expected: &str) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn unsupported(path: &Path) -> SettingsError {
    ConfigError::UnsupportedFormat(format!(
        "{} (job files must be .json or .toml)",
        path.display()
    ))
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_input_parsing() {
        assert_eq!(NumberInput::from(" 12.5 ").value(), Some(12.5));
        assert_eq!(NumberInput::from("-0.086").value(), Some(-0.086));
        assert_eq!(NumberInput::from("abc").value(), None);
        assert_eq!(NumberInput::from("").value(), None);
        assert_eq!(NumberInput::from("inf").value(), None);
        assert_eq!(NumberInput::from(3.0).value(), Some(3.0));
    }

    #[test]
    fn test_to_count_truncates() {
        assert_eq!(to_count("k", 2.9).unwrap(), 2);
        assert_eq!(to_count("k", 0.0).unwrap(), 0);
        assert!(to_count("k", -1.0).is_err());
    }

    #[test]
    fn test_default_texts_are_trimmed_on_resolve() {
        let resolved = JobConfig::default().resolve().unwrap();
        assert!(resolved.config.preamble.starts_with("M201"));
        assert!(resolved.config.preamble.ends_with(';'));
        assert!(resolved.config.cycles.subroutine.ends_with(";;;"));
    }
}
