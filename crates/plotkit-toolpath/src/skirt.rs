//! Outline passes traced before the main body
//!
//! A skirt is a closed rectangle from the origin followed by a short dwell.
//! It lets the operator check placement before any real cutting happens.

use crate::codes::MoveKind;
use crate::document::ToolpathDocument;
use crate::line::ToolpathLine;
use crate::pipeline::StageContext;

/// Rectangular outline pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skirt {
    /// Width along X (mm)
    pub width: f64,
    /// Height along Y (mm)
    pub height: f64,
    /// Dwell after the outline (seconds)
    pub dwell_seconds: f64,
}

impl Skirt {
    /// Create a skirt
    pub fn new(width: f64, height: f64, dwell_seconds: f64) -> Self {
        Self {
            width,
            height,
            dwell_seconds,
        }
    }

    /// Four-corner closed path plus dwell, using the cut move code
    pub fn to_document(&self, context: &StageContext) -> ToolpathDocument {
        let codes = &context.codes;
        let cut = codes.move_code(MoveKind::Cut);
        let w = context.format.format(self.width);
        let h = context.format.format(self.height);
        let texts = [
            format!("{} X{} Y0", cut, w),
            format!("{} X{} Y{}", cut, w, h),
            format!("{} X0 Y{}", cut, h),
            format!("{} X0 Y0", cut),
            format!(
                "{} S{}",
                codes.dwell,
                context.format.format(self.dwell_seconds)
            ),
        ];

        texts
            .iter()
            .map(|text| ToolpathLine::parse(text, 0, codes).0)
            .collect()
    }
}
