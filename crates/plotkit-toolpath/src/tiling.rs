//! Tiling of a unit cell
//!
//! The unit cell is replicated over an Nx × Ny grid. Each copy is scaled
//! about the origin and translated by its grid offset; the code stays in
//! absolute coordinates.

use plotkit_core::{ConfigError, GcodeError};

use crate::document::ToolpathDocument;
use crate::line::ToolpathLine;
use crate::pipeline::{DocumentStage, StageContext};

/// Grid used to replicate the unit cell
#[derive(Debug, Clone, PartialEq)]
pub struct TilingSpec {
    /// Number of tiles along X
    pub count_x: u32,
    /// Number of tiles along Y
    pub count_y: u32,
    /// Translation step between tiles along X (mm)
    pub spacing_x: f64,
    /// Translation step between tiles along Y (mm)
    pub spacing_y: f64,
    /// Uniform coordinate multiplier
    pub scale: f64,
}

impl TilingSpec {
    /// Create new tiling parameters
    pub fn new(count_x: u32, count_y: u32, spacing_x: f64, spacing_y: f64, scale: f64) -> Self {
        debug_assert!(
            spacing_x.is_finite(),
            "spacing_x must be finite, got {spacing_x}"
        );
        debug_assert!(
            spacing_y.is_finite(),
            "spacing_y must be finite, got {spacing_y}"
        );
        Self {
            count_x,
            count_y,
            spacing_x,
            spacing_y,
            scale,
        }
    }

    /// Validate parameters
    ///
    /// A zero count yields an empty tile set and a zero scale collapses
    /// every copy onto its offset; both are runnable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.spacing_x.is_finite() {
            return Err(out_of_range("tiling.spacing_x", self.spacing_x, "a finite number"));
        }
        if !self.spacing_y.is_finite() {
            return Err(out_of_range("tiling.spacing_y", self.spacing_y, "a finite number"));
        }
        if !(self.scale.is_finite() && self.scale >= 0.0) {
            return Err(out_of_range("tiling.scale", self.scale, ">= 0"));
        }
        Ok(())
    }

    /// Get total number of tiles
    pub fn total_tiles(&self) -> u64 {
        self.count_x as u64 * self.count_y as u64
    }

    /// Translation of the tile at grid position (i, j)
    pub fn offset(&self, i: u32, j: u32) -> (f64, f64) {
        (i as f64 * self.spacing_x, j as f64 * self.spacing_y)
    }

    /// Grid positions in emission order: i (X) outer, j (Y) inner
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.count_x).flat_map(move |i| (0..self.count_y).map(move |j| (i, j)))
    }
}

impl Default for TilingSpec {
    fn default() -> Self {
        Self::new(1, 1, 0.0, 0.0, 1.0)
    }
}

pub(crate) fn out_of_range(key: &str, value: impl ToString, expected: &str) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

/// Produces one scaled, translated copy of the unit cell per grid position
#[derive(Debug, Clone)]
pub struct CellOffsetter {
    spec: TilingSpec,
}

impl CellOffsetter {
    /// Create a new cell offsetter
    pub fn new(spec: TilingSpec) -> Self {
        Self { spec }
    }

    /// Tiling parameters
    pub fn spec(&self) -> &TilingSpec {
        &self.spec
    }

    /// Build the copy for a single grid position
    pub fn tile(
        &self,
        cell: &ToolpathDocument,
        i: u32,
        j: u32,
        context: &StageContext,
    ) -> ToolpathDocument {
        let (offset_x, offset_y) = self.spec.offset(i, j);
        let scale = self.spec.scale;

        cell.iter()
            .map(|line| match line {
                ToolpathLine::Move(line) => ToolpathLine::Move(line.map_xy(
                    |x| x * scale + offset_x,
                    |y| y * scale + offset_y,
                    context.format,
                )),
                other => other.clone(),
            })
            .collect()
    }
}

impl DocumentStage for CellOffsetter {
    fn name(&self) -> &str {
        "cell_offsetter"
    }

    fn description(&self) -> &str {
        "Replicates the unit cell over the tile grid with scaling and offsets"
    }

    fn apply(
        &self,
        document: &ToolpathDocument,
        context: &StageContext,
    ) -> Result<ToolpathDocument, GcodeError> {
        let tiles: Vec<ToolpathDocument> = self
            .spec
            .positions()
            .map(|(i, j)| self.tile(document, i, j, context))
            .collect();

        tracing::debug!(
            "Tiled {} line cell into {} copies",
            document.len(),
            tiles.len()
        );
        Ok(ToolpathDocument::concat(&tiles))
    }
}
