//! Freehand ink stroke.

use super::style::check_width;
use super::{Color, Point, check_point};
use crate::error::EditResult;
use crate::geometry::{self, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke. Points are kept in draw order; a single point is a dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub points: Vec<Point>,
}

impl Stroke {
    /// Create a stroke, rejecting non-positive widths and non-finite points.
    pub fn new(color: Color, width: f32, points: Vec<Point>) -> EditResult<Self> {
        let stroke = Self {
            color,
            width,
            points,
        };
        stroke.validate()?;
        Ok(stroke)
    }

    /// Check width and coordinates.
    pub fn validate(&self) -> EditResult<()> {
        check_width(self.width)?;
        self.points.iter().try_for_each(|p| check_point(*p))
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the points, `None` for an empty stroke.
    pub fn bounds(&self) -> Option<Rect> {
        let (first, rest) = self.points.split_first()?;
        Some(
            rest.iter()
                .fold(Rect::from_points(*first, *first), |r, p| {
                    r.union(Rect::from_points(*p, *p))
                }),
        )
    }

    /// Eraser proximity: true if any segment (or the lone dot) lies within `radius`.
    pub fn is_near(&self, point: Point, radius: f32) -> bool {
        geometry::polyline_within(point, &self.points, radius)
    }
}
