//! Drawable items: freehand strokes and geometric shapes.

mod stroke;
mod style;

pub use stroke::Stroke;
pub use style::{Color, ShapeStyle};

use crate::error::{EditError, EditResult};
use crate::geometry::{self, Rect};
use serde::{Deserialize, Serialize};

/// Identifier of a committed shape. Zero means "not yet committed".
pub type ShapeId = u64;

/// A point in device-independent plane coordinates (top-left origin, y-down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Reject points that cannot be drawn or encoded.
pub(crate) fn check_point(p: Point) -> EditResult<()> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(EditError::NonFinitePoint { x: p.x, y: p.y })
    }
}

/// The fixed set of shape tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    RoundedRectangle,
    Ellipse,
    Arrow,
    CurvedArrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::RoundedRectangle,
        ShapeKind::Ellipse,
        ShapeKind::Arrow,
        ShapeKind::CurvedArrow,
    ];

    /// Closed shapes have an interior: they support fill, hatch and text.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ShapeKind::Rectangle | ShapeKind::RoundedRectangle | ShapeKind::Ellipse
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::RoundedRectangle => "roundedRectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Arrow => "arrow",
            ShapeKind::CurvedArrow => "curvedArrow",
        }
    }
}

/// Horizontal placement of text inside a closed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlignH {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of text inside a closed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlignV {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Binds an arrow endpoint to a closed shape.
///
/// The target is looked up by id when arrows are resolved; if it is gone the
/// endpoint falls back to the stored point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub shape_id: ShapeId,
    /// Anchor inside the target's bounds, `(0, 0)` top-left to `(1, 1)`
    /// bottom-right, projected onto the outline. `None` anchors where the
    /// line toward the other endpoint leaves the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<Point>,
}

impl Attachment {
    pub fn new(shape_id: ShapeId) -> Self {
        Self { shape_id, uv: None }
    }

    pub fn at(shape_id: ShapeId, uv: Point) -> Self {
        Self {
            shape_id,
            uv: Some(uv),
        }
    }
}

/// A geometric shape spanned by `start` and `end`.
///
/// The bounding rectangle is the min/max of both points; zero-area shapes are
/// allowed and behave as lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub style: ShapeStyle,
    pub start: Point,
    pub end: Point,
    /// Label text; only closed shapes display it.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub text_align_h: TextAlignH,
    #[serde(default)]
    pub text_align_v: TextAlignV,
    /// Closed shape the arrow's start is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_attach: Option<Attachment>,
    /// Closed shape the arrow's end is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_attach: Option<Attachment>,
}

impl Shape {
    /// An uncommitted shape collapsed onto `start`.
    pub(crate) fn uncommitted(kind: ShapeKind, style: ShapeStyle, start: Point) -> Self {
        Self {
            id: 0,
            kind,
            style,
            start,
            end: start,
            text: String::new(),
            text_align_h: TextAlignH::default(),
            text_align_v: TextAlignV::default(),
            start_attach: None,
            end_attach: None,
        }
    }

    /// Check style, coordinates and attachment anchors.
    pub fn validate(&self) -> EditResult<()> {
        self.style.validate()?;
        check_point(self.start)?;
        check_point(self.end)?;
        [self.start_attach, self.end_attach]
            .iter()
            .flatten()
            .filter_map(|attachment| attachment.uv)
            .try_for_each(check_point)
    }

    pub fn is_closed(&self) -> bool {
        self.kind.is_closed()
    }

    /// Bounding rectangle of `start`/`end`.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    /// Control point of the curve, for curved arrows only.
    pub fn curve_control(&self) -> Option<Point> {
        match self.kind {
            ShapeKind::CurvedArrow => Some(geometry::control_point_for_curve(self.start, self.end)),
            _ => None,
        }
    }

    /// Selection hit test.
    ///
    /// Closed shapes use exact interior containment; open shapes (and
    /// degenerate closed shapes) fall back to the bounding rectangle.
    pub fn contains(&self, point: Point) -> bool {
        let rect = self.bounds();
        match self.kind {
            ShapeKind::Rectangle => rect.contains(point),
            ShapeKind::RoundedRectangle if !rect.is_degenerate() => {
                let path = geometry::rounded_rect_path(rect, self.style.corner_radius);
                geometry::path_contains(&path, point)
            }
            ShapeKind::Ellipse => geometry::ellipse_contains(rect, point),
            ShapeKind::RoundedRectangle | ShapeKind::Arrow | ShapeKind::CurvedArrow => {
                rect.contains(point)
            }
        }
    }

    /// Eraser proximity: true if the outline (never the fill) passes within `radius`.
    pub fn is_near(&self, point: Point, radius: f32) -> bool {
        let rect = self.bounds();
        match self.kind {
            // rounded corners erase like square ones
            ShapeKind::Rectangle | ShapeKind::RoundedRectangle => {
                geometry::rect_boundary_within(rect, point, radius)
            }
            ShapeKind::Ellipse => {
                geometry::ellipse_boundary_within(rect, self.start, self.end, point, radius)
            }
            ShapeKind::Arrow => geometry::polyline_within(point, &[self.start, self.end], radius),
            ShapeKind::CurvedArrow => {
                let control = geometry::control_point_for_curve(self.start, self.end);
                let samples = geometry::sample_quadratic_bezier(
                    self.start,
                    control,
                    self.end,
                    geometry::CURVE_SAMPLES,
                );
                geometry::polyline_within(point, &samples, radius)
            }
        }
    }

    /// Barb points of the arrowhead at `end`, for arrow kinds only.
    pub fn arrow_head(&self) -> Option<(Point, Point)> {
        let from = match self.kind {
            ShapeKind::Arrow => self.start,
            ShapeKind::CurvedArrow => geometry::control_point_for_curve(self.start, self.end),
            _ => return None,
        };
        Some(geometry::arrow_head(from, self.end, self.style.stroke_width))
    }
}

/// An entry in the document: a stroke or a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Item {
    Stroke(Stroke),
    Shape(Shape),
}

impl Item {
    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Item::Shape(shape) => Some(shape),
            Item::Stroke(_) => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Item::Stroke(stroke) => Some(stroke),
            Item::Shape(_) => None,
        }
    }

    /// Id of the shape, `None` for strokes (strokes are unaddressable).
    pub fn shape_id(&self) -> Option<ShapeId> {
        self.as_shape().map(|shape| shape.id)
    }

    /// Eraser proximity test.
    pub fn is_near(&self, point: Point, radius: f32) -> bool {
        match self {
            Item::Stroke(stroke) => stroke.is_near(point, radius),
            Item::Shape(shape) => shape.is_near(point, radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: ShapeKind, start: Point, end: Point) -> Shape {
        let mut shape = Shape::uncommitted(kind, ShapeStyle::default(), start);
        shape.end = end;
        shape
    }

    #[test]
    fn test_closed_kinds() {
        assert!(ShapeKind::Rectangle.is_closed());
        assert!(ShapeKind::RoundedRectangle.is_closed());
        assert!(ShapeKind::Ellipse.is_closed());
        assert!(!ShapeKind::Arrow.is_closed());
        assert!(!ShapeKind::CurvedArrow.is_closed());
    }

    #[test]
    fn test_uncommitted_shape_collapsed() {
        let s = Shape::uncommitted(ShapeKind::Ellipse, ShapeStyle::default(), Point::new(3.0, 4.0));
        assert_eq!(s.id, 0);
        assert_eq!(s.start, s.end);
        assert!(s.text.is_empty());
    }

    #[test]
    fn test_rectangle_contains_interior_but_eraser_needs_edge() {
        let rect = shape(ShapeKind::Rectangle, Point::new(10.0, 10.0), Point::new(50.0, 50.0));
        assert!(rect.contains(Point::new(30.0, 30.0)));
        assert!(!rect.is_near(Point::new(30.0, 30.0), 5.0));
        assert!(rect.is_near(Point::new(10.0, 30.0), 1.0));
        assert!(rect.is_near(Point::new(30.0, 53.0), 5.0));
    }

    #[test]
    fn test_rounded_rectangle_corner_not_hit() {
        let mut s = shape(ShapeKind::RoundedRectangle, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        s.style.corner_radius = 40.0;
        assert!(s.contains(Point::new(50.0, 50.0)));
        assert!(!s.contains(Point::new(2.0, 2.0)));
        // with the radius clamped to zero the corner is solid again
        s.style.corner_radius = 0.0;
        assert!(s.contains(Point::new(2.0, 2.0)));
        assert!(s.is_near(Point::new(0.0, 0.0), 1.0));
    }

    #[test]
    fn test_rounded_rectangle_erased_at_square_corner() {
        let mut s = shape(ShapeKind::RoundedRectangle, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        s.style.corner_radius = 40.0;
        assert!(s.is_near(Point::new(0.0, 0.0), 3.0));
        assert!(s.is_near(Point::new(100.0, 50.0), 1.0));
        assert!(!s.is_near(Point::new(50.0, 50.0), 3.0));
    }

    #[test]
    fn test_validate_rejects_non_finite_geometry() {
        let mut s = shape(ShapeKind::Rectangle, Point::new(0.0, 0.0), Point::new(f32::INFINITY, 1.0));
        assert!(matches!(s.validate(), Err(EditError::NonFinitePoint { .. })));
        s.end = Point::new(1.0, 1.0);
        assert!(s.validate().is_ok());
        s.end_attach = Some(Attachment::at(3, Point::new(f32::NAN, 0.5)));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_attachment_serde_defaults() {
        let s = shape(ShapeKind::Arrow, Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("startAttach").is_none());

        let mut attached = s.clone();
        attached.start_attach = Some(Attachment::new(4));
        let json = serde_json::to_value(&attached).unwrap();
        assert_eq!(json["startAttach"]["shapeId"], 4);
        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, attached);
    }

    #[test]
    fn test_ellipse_interior() {
        let s = shape(ShapeKind::Ellipse, Point::new(0.0, 0.0), Point::new(100.0, 50.0));
        assert!(s.contains(Point::new(50.0, 25.0)));
        assert!(!s.contains(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_arrow_uses_bounding_rect_for_hits() {
        let s = shape(ShapeKind::Arrow, Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert!(s.contains(Point::new(90.0, 10.0)));
        assert!(!s.is_near(Point::new(90.0, 10.0), 5.0));
        assert!(s.is_near(Point::new(50.0, 51.0), 2.0));
    }

    #[test]
    fn test_curved_arrow_erased_along_curve() {
        let s = shape(ShapeKind::CurvedArrow, Point::new(0.0, 0.0), Point::new(200.0, 0.0));
        let control = s.curve_control().unwrap();
        let mid = geometry::quadratic_point(s.start, control, s.end, 0.5);
        assert!(s.is_near(mid, 1.0));
        // the straight chord midpoint is off the curve
        assert!(!s.is_near(Point::new(100.0, 0.0), 1.0));
    }

    #[test]
    fn test_arrow_head_only_for_arrows() {
        let arrow = shape(ShapeKind::Arrow, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(arrow.arrow_head().is_some());
        let rect = shape(ShapeKind::Rectangle, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(rect.arrow_head().is_none());
    }

    #[test]
    fn test_item_shape_id() {
        let s = Item::Shape(shape(ShapeKind::Arrow, Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        assert_eq!(s.shape_id(), Some(0));
        let stroke = Item::Stroke(Stroke::new(Color::black(), 1.0, vec![Point::new(0.0, 0.0)]).unwrap());
        assert_eq!(stroke.shape_id(), None);
    }
}
