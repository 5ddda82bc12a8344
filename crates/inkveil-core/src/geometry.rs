//! Geometry kernel used by hit-testing and the eraser.
//!
//! The curve constants here are a contract with every shell: a curved arrow
//! must be hit-tested along the same polyline the shell rasterizes.

use crate::shapes::Point;
use kurbo::{BezPath, RoundedRect, Shape as KurboShape};

/// Number of polyline segments used to approximate a curved arrow.
pub const CURVE_SAMPLES: usize = 16;
/// Perpendicular offset of the curve control point, as a fraction of the chord.
pub const CURVE_OFFSET_RATIO: f32 = 0.22;
/// Smallest perpendicular offset of the curve control point.
pub const CURVE_OFFSET_MIN: f32 = 18.0;
/// Largest perpendicular offset of the curve control point.
pub const CURVE_OFFSET_MAX: f32 = 160.0;
/// Chords shorter than this curve through their midpoint (i.e. stay straight).
const CURVE_MIN_CHORD: f32 = 0.5;

/// Flattening tolerance for rounded-rectangle paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Minimum arrowhead length.
pub const ARROW_HEAD_MIN_LENGTH: f32 = 10.0;
/// Minimum arrowhead width.
pub const ARROW_HEAD_MIN_WIDTH: f32 = 8.0;

/// Axis-aligned rectangle with normalized corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Canonical rectangle spanned by two corners in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Inclusive containment, so zero-area rectangles still contain their line.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.min_x - dx,
            self.min_y - dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    pub fn union(&self, other: Rect) -> Rect {
        Rect::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// True when either side has (near) zero length.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= f32::EPSILON || self.height() <= f32::EPSILON
    }

    /// Corners in clockwise order starting top-left (y-down).
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Squared distance between two points.
pub fn distance_squared(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the closest point of the segment `[a, b]`.
///
/// A degenerate segment falls back to point distance.
pub fn distance_squared_point_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let apx = p.x - a.x;
    let apy = p.y - a.y;
    let ab_len2 = abx * abx + aby * aby;
    if ab_len2 <= f32::EPSILON {
        return apx * apx + apy * apy;
    }
    let t = ((apx * abx + apy * aby) / ab_len2).clamp(0.0, 1.0);
    distance_squared(p, Point::new(a.x + t * abx, a.y + t * aby))
}

/// True if any segment of the polyline is within `radius` of `p`.
/// A single point is treated as a dot; an empty polyline never matches.
pub fn polyline_within(p: Point, points: &[Point], radius: f32) -> bool {
    let r2 = radius * radius;
    match points {
        [] => false,
        [only] => distance_squared(p, *only) <= r2,
        _ => points
            .windows(2)
            .any(|w| distance_squared_point_to_segment(p, w[0], w[1]) <= r2),
    }
}

/// True if any edge of the rectangle outline is within `radius` of `p`.
pub fn rect_boundary_within(rect: Rect, p: Point, radius: f32) -> bool {
    let [tl, tr, br, bl] = rect.corners();
    polyline_within(p, &[tl, tr, br, bl, tl], radius)
}

/// Corner radius actually used for a rectangle: at most half its shorter side.
pub fn clamp_corner_radius(rect: Rect, radius: f32) -> f32 {
    let max = rect.width().min(rect.height()) * 0.5;
    radius.clamp(0.0, max.max(0.0))
}

/// Closed rounded-rectangle path with the radius clamped to fit.
pub fn rounded_rect_path(rect: Rect, radius: f32) -> BezPath {
    let radius = clamp_corner_radius(rect, radius);
    RoundedRect::from_rect(to_kurbo_rect(rect), radius as f64).to_path(PATH_TOLERANCE)
}

/// Interior containment for a closed path (non-zero winding).
pub fn path_contains(path: &BezPath, p: Point) -> bool {
    path.contains(p.into())
}

/// Normalized ellipse equation value `(dx/a)² + (dy/b)²` for the ellipse
/// inscribed in `rect`. `None` when the rectangle is degenerate.
pub fn ellipse_value(rect: Rect, p: Point) -> Option<f32> {
    if rect.is_degenerate() {
        return None;
    }
    let c = rect.center();
    let a = rect.width() * 0.5;
    let b = rect.height() * 0.5;
    let dx = p.x - c.x;
    let dy = p.y - c.y;
    Some((dx * dx) / (a * a) + (dy * dy) / (b * b))
}

/// Interior containment of the ellipse inscribed in `rect`.
/// Degenerate ellipses behave as their bounding line.
pub fn ellipse_contains(rect: Rect, p: Point) -> bool {
    match ellipse_value(rect, p) {
        Some(value) => value <= 1.0,
        None => rect.contains(p),
    }
}

/// Approximate boundary proximity for the ellipse inscribed in `rect`.
///
/// Distance is estimated as `|value - 1| * min(a, b)`, not the exact normal
/// distance; it overestimates along the long axis of very flat ellipses.
pub fn ellipse_boundary_within(rect: Rect, start: Point, end: Point, p: Point, radius: f32) -> bool {
    match ellipse_value(rect, p) {
        Some(value) => {
            let a = rect.width() * 0.5;
            let b = rect.height() * 0.5;
            let approx = (value - 1.0).abs() * a.min(b);
            approx * approx <= radius * radius
        }
        None => distance_squared_point_to_segment(p, start, end) <= radius * radius,
    }
}

/// Control point of the quadratic curve drawn for a curved arrow.
///
/// Offset perpendicular to the chord from its midpoint by
/// `clamp(len * 0.22, 18, 160)`; the side is picked by `sign(dx * dy)` so the
/// same endpoints always bend the same way.
pub fn control_point_for_curve(start: Point, end: Point) -> Point {
    let mid = start.midpoint(end);
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= CURVE_MIN_CHORD {
        return mid;
    }
    let perp_x = -dy / len;
    let perp_y = dx / len;
    let sign = if dx * dy >= 0.0 { 1.0 } else { -1.0 };
    let magnitude = (len * CURVE_OFFSET_RATIO).clamp(CURVE_OFFSET_MIN, CURVE_OFFSET_MAX) * sign;
    Point::new(mid.x + perp_x * magnitude, mid.y + perp_y * magnitude)
}

/// Point on a quadratic Bézier at parameter `t`.
pub fn quadratic_point(start: Point, control: Point, end: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let a = u * u;
    let b = 2.0 * u * t;
    let c = t * t;
    Point::new(
        a * start.x + b * control.x + c * end.x,
        a * start.y + b * control.y + c * end.y,
    )
}

/// Polyline approximation of a quadratic Bézier with `steps + 1` points.
pub fn sample_quadratic_bezier(start: Point, control: Point, end: Point, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| quadratic_point(start, control, end, i as f32 / steps as f32))
        .collect()
}

/// Barb points of an arrowhead whose tip is `tip`, arriving from `from`.
///
/// Returns `(tip, tip)` when the direction is undefined.
pub fn arrow_head(from: Point, tip: Point, stroke_width: f32) -> (Point, Point) {
    let dx = tip.x - from.x;
    let dy = tip.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= 1e-6 {
        return (tip, tip);
    }
    let ux = dx / len;
    let uy = dy / len;
    let head_length = (stroke_width * 4.0).max(ARROW_HEAD_MIN_LENGTH);
    let half_width = (stroke_width * 3.0).max(ARROW_HEAD_MIN_WIDTH) * 0.5;
    let base = Point::new(tip.x - ux * head_length, tip.y - uy * head_length);
    (
        Point::new(base.x - uy * half_width, base.y + ux * half_width),
        Point::new(base.x + uy * half_width, base.y - ux * half_width),
    )
}

pub(crate) fn to_kurbo_rect(rect: Rect) -> kurbo::Rect {
    kurbo::Rect::new(
        rect.min_x as f64,
        rect.min_y as f64,
        rect.max_x as f64,
        rect.max_y as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = pt(0.0, 0.0);
        let b = pt(10.0, 0.0);
        assert_eq!(distance_squared_point_to_segment(pt(5.0, 3.0), a, b), 9.0);
        assert_eq!(distance_squared_point_to_segment(pt(-3.0, 4.0), a, b), 25.0);
        assert_eq!(distance_squared_point_to_segment(pt(13.0, 4.0), a, b), 25.0);
    }

    #[test]
    fn test_degenerate_segment_is_point_distance() {
        let a = pt(2.0, 2.0);
        assert_eq!(distance_squared_point_to_segment(pt(5.0, 6.0), a, a), 25.0);
    }

    #[test]
    fn test_rect_from_points_normalizes() {
        let rect = Rect::from_points(pt(100.0, 10.0), pt(50.0, 80.0));
        assert_eq!(rect, Rect::new(50.0, 10.0, 100.0, 80.0));
        assert_eq!(rect.width(), 50.0);
        assert_eq!(rect.height(), 70.0);
    }

    #[test]
    fn test_degenerate_rect_contains_its_line() {
        let rect = Rect::from_points(pt(0.0, 5.0), pt(10.0, 5.0));
        assert!(rect.is_degenerate());
        assert!(rect.contains(pt(4.0, 5.0)));
        assert!(!rect.contains(pt(4.0, 5.5)));
    }

    #[test]
    fn test_corner_radius_clamped() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        assert_eq!(clamp_corner_radius(rect, 100.0), 10.0);
        assert_eq!(clamp_corner_radius(rect, 4.0), 4.0);
        assert_eq!(clamp_corner_radius(rect, -4.0), 0.0);
    }

    #[test]
    fn test_rounded_rect_path_containment() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let path = rounded_rect_path(rect, 30.0);
        assert!(path_contains(&path, pt(50.0, 50.0)));
        // the square corner is cut away by the rounding
        assert!(!path_contains(&path, pt(1.0, 1.0)));
        assert!(!path_contains(&path, pt(150.0, 50.0)));
    }

    #[test]
    fn test_rect_boundary_within() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(rect_boundary_within(rect, pt(50.0, 2.0), 3.0));
        assert!(!rect_boundary_within(rect, pt(50.0, 50.0), 3.0));
        assert!(rect_boundary_within(rect, pt(0.0, 0.0), 3.0));
        assert!(rect_boundary_within(rect, pt(102.0, 40.0), 3.0));
    }

    #[test]
    fn test_ellipse_containment() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(ellipse_contains(rect, pt(50.0, 25.0)));
        assert!(ellipse_contains(rect, pt(100.0, 25.0)));
        assert!(!ellipse_contains(rect, pt(2.0, 2.0)));
    }

    #[test]
    fn test_ellipse_boundary_approximation() {
        let start = pt(0.0, 0.0);
        let end = pt(100.0, 100.0);
        let rect = Rect::from_points(start, end);
        assert!(ellipse_boundary_within(rect, start, end, pt(100.0, 50.0), 2.0));
        assert!(!ellipse_boundary_within(rect, start, end, pt(50.0, 50.0), 2.0));
    }

    #[test]
    fn test_degenerate_ellipse_uses_segment() {
        let start = pt(0.0, 0.0);
        let end = pt(100.0, 0.0);
        let rect = Rect::from_points(start, end);
        assert!(ellipse_boundary_within(rect, start, end, pt(50.0, 1.0), 2.0));
        assert!(!ellipse_boundary_within(rect, start, end, pt(50.0, 10.0), 2.0));
    }

    #[test]
    fn test_control_point_offset_clamped() {
        // short chord: minimum offset applies
        let c = control_point_for_curve(pt(0.0, 0.0), pt(10.0, 0.0));
        assert_eq!(c.x, 5.0);
        assert!((c.y.abs() - CURVE_OFFSET_MIN).abs() < 1e-4);

        // long chord: maximum offset applies
        let c = control_point_for_curve(pt(0.0, 0.0), pt(0.0, 1000.0));
        assert!((c.x.abs() - CURVE_OFFSET_MAX).abs() < 1e-3);
        assert_eq!(c.y, 500.0);
    }

    #[test]
    fn test_control_point_side_follows_sign() {
        let down_right = control_point_for_curve(pt(0.0, 0.0), pt(100.0, 100.0));
        let up_right = control_point_for_curve(pt(0.0, 100.0), pt(100.0, 0.0));
        // perpendicular is (-dy, dx)/len, flipped when dx*dy < 0
        assert!(down_right.x < 50.0);
        assert!(up_right.x < 50.0);
    }

    #[test]
    fn test_tiny_chord_control_is_midpoint() {
        let c = control_point_for_curve(pt(1.0, 1.0), pt(1.25, 1.25));
        assert_eq!(c, pt(1.125, 1.125));
    }

    #[test]
    fn test_sample_quadratic_endpoints() {
        let samples = sample_quadratic_bezier(pt(0.0, 0.0), pt(50.0, 50.0), pt(100.0, 0.0), CURVE_SAMPLES);
        assert_eq!(samples.len(), CURVE_SAMPLES + 1);
        assert_eq!(samples[0], pt(0.0, 0.0));
        assert_eq!(samples[CURVE_SAMPLES], pt(100.0, 0.0));
        assert_eq!(samples[CURVE_SAMPLES / 2], pt(50.0, 25.0));
    }

    #[test]
    fn test_arrow_head_geometry() {
        let (left, right) = arrow_head(pt(0.0, 0.0), pt(100.0, 0.0), 2.0);
        // length max(8, 10) = 10, width max(6, 8) = 8
        assert_eq!(left, pt(90.0, 4.0));
        assert_eq!(right, pt(90.0, -4.0));

        let (left, right) = arrow_head(pt(5.0, 5.0), pt(5.0, 5.0), 2.0);
        assert_eq!(left, pt(5.0, 5.0));
        assert_eq!(right, pt(5.0, 5.0));
    }
}
