//! Bounding extent of a toolpath
//!
//! Extents are tracked per axis as two running maxima: the largest positive
//! coordinate and the largest magnitude of a negative coordinate. The span
//! on an axis is their sum, which is the true size only when the path
//! straddles the origin (converter output always does).

use serde::Serialize;

use crate::document::ToolpathDocument;
use crate::tiling::TilingSpec;

/// Running per-axis maxima over a document's move lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingExtent {
    /// Largest positive X
    pub max_positive_x: f64,
    /// Largest magnitude of a negative X
    pub max_negative_x: f64,
    /// Largest positive Y
    pub max_positive_y: f64,
    /// Largest magnitude of a negative Y
    pub max_negative_y: f64,
}

impl BoundingExtent {
    /// Create an empty extent
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an X coordinate
    pub fn observe_x(&mut self, value: f64) {
        update(&mut self.max_positive_x, &mut self.max_negative_x, value);
    }

    /// Record a Y coordinate
    pub fn observe_y(&mut self, value: f64) {
        update(&mut self.max_positive_y, &mut self.max_negative_y, value);
    }

    /// Size along X
    pub fn span_x(&self) -> f64 {
        self.max_positive_x + self.max_negative_x
    }

    /// Size along Y
    pub fn span_y(&self) -> f64 {
        self.max_positive_y + self.max_negative_y
    }
}

// Ties do not update.
fn update(positive: &mut f64, negative: &mut f64, value: f64) {
    if value > 0.0 {
        if value > *positive {
            *positive = value;
        }
    } else if value < 0.0 && -value > *negative {
        *negative = -value;
    }
}

/// Computes the extent of the recognised move lines of a document
#[derive(Debug)]
pub struct BoundsCalculator;

impl BoundsCalculator {
    /// Scan every move line and accumulate its X and Y fields
    ///
    /// Lines that are not cut or travel moves are ignored, including
    /// comments that happen to contain X or Y.
    pub fn calculate(document: &ToolpathDocument) -> BoundingExtent {
        let mut extent = BoundingExtent::new();
        for line in document.iter().filter_map(|line| line.as_move()) {
            if let Some(x) = line.x() {
                extent.observe_x(x);
            }
            if let Some(y) = line.y() {
                extent.observe_y(y);
            }
        }
        extent
    }
}

/// Part and work-area dimensions for a tiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkArea {
    /// Scaled width of one tile
    pub part_width: f64,
    /// Scaled height of one tile
    pub part_height: f64,
    /// Width of the full tile grid
    pub work_width: f64,
    /// Height of the full tile grid
    pub work_height: f64,
}

impl WorkArea {
    /// Derive part and work dimensions from a unit-cell extent
    pub fn new(extent: &BoundingExtent, tiling: &TilingSpec) -> Self {
        let part_width = extent.span_x() * tiling.scale;
        let part_height = extent.span_y() * tiling.scale;
        let work_width =
            part_width * tiling.count_x as f64 + (tiling.count_x as f64 - 1.0) * tiling.spacing_x;
        let work_height =
            part_height * tiling.count_y as f64 + (tiling.count_y as f64 - 1.0) * tiling.spacing_y;

        Self {
            part_width,
            part_height,
            work_width,
            work_height,
        }
    }
}

impl std::fmt::Display for WorkArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Part Bounds: X: {}mm  Y: {}mm",
            self.part_width, self.part_height
        )?;
        write!(
            f,
            "Work Bounds: X: {}mm  Y: {}mm",
            self.work_width, self.work_height
        )
    }
}
