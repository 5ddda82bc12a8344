//! Colors and shape styling.

use crate::error::{EditError, EditResult};
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Reject widths that cannot be drawn.
pub(crate) fn check_width(width: f32) -> EditResult<()> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(EditError::InvalidStyle { width })
    }
}

/// Style properties for shapes.
///
/// `corner_radius` is stored exactly as entered; it is clamped to half the
/// shorter side only when a path is built from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Outline color.
    pub stroke_color: Color,
    /// Outline width, always positive.
    pub stroke_width: f32,
    /// Whether closed shapes are filled.
    pub fill_enabled: bool,
    /// Fill color (used only when `fill_enabled`).
    pub fill_color: Color,
    /// Whether closed shapes get a hatch pattern.
    pub hatch_enabled: bool,
    /// Corner radius for rounded rectangles.
    pub corner_radius: f32,
}

impl ShapeStyle {
    /// Create an outline-only style.
    pub fn new(stroke_color: Color, stroke_width: f32) -> EditResult<Self> {
        check_width(stroke_width)?;
        Ok(Self {
            stroke_color,
            stroke_width,
            ..Self::default()
        })
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_enabled = true;
        self.fill_color = color;
        self
    }

    pub fn with_hatch(mut self, enabled: bool) -> Self {
        self.hatch_enabled = enabled;
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Check the invariants a committed shape must hold.
    pub fn validate(&self) -> EditResult<()> {
        check_width(self.stroke_width)?;
        if !self.corner_radius.is_finite() {
            return Err(EditError::InvalidCornerRadius {
                radius: self.corner_radius,
            });
        }
        Ok(())
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::black(),
            stroke_width: 3.0,
            fill_enabled: false,
            fill_color: Color::transparent(),
            hatch_enabled: false,
            corner_radius: 12.0,
        }
    }
}
