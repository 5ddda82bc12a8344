//! Conversions and path builders for rendering shells.
//!
//! Shells rasterize the document themselves. These helpers turn core items
//! into `kurbo` paths and `peniko` colors so every shell draws exactly the
//! geometry the core hit-tests against.

use crate::geometry::{self, Rect};
use crate::routing::{ArrowPath, ArrowRender};
use crate::shapes::{Color, Item, Point, Shape, ShapeKind, Stroke};
use kurbo::{BezPath, Shape as KurboShape};

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x as f32, p.y as f32)
    }
}

impl From<Rect> for kurbo::Rect {
    fn from(rect: Rect) -> Self {
        geometry::to_kurbo_rect(rect)
    }
}

impl From<kurbo::Rect> for Rect {
    fn from(rect: kurbo::Rect) -> Self {
        Rect::from_points(
            Point::new(rect.x0 as f32, rect.y0 as f32),
            Point::new(rect.x1 as f32, rect.y1 as f32),
        )
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let rgba = color.to_rgba8();
        Color::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl Stroke {
    /// Polyline through the stroke's points.
    ///
    /// A single-point stroke becomes a zero-length segment so round caps
    /// still draw a dot.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };

        path.move_to(*first);
        if rest.is_empty() {
            path.line_to(*first);
        }
        for point in rest {
            path.line_to(*point);
        }

        path
    }
}

impl Shape {
    /// Outline path, including the arrowhead for arrow kinds.
    pub fn outline(&self) -> BezPath {
        let rect = self.bounds();
        match self.kind {
            ShapeKind::Rectangle => kurbo::Rect::from(rect).to_path(geometry::PATH_TOLERANCE),
            ShapeKind::RoundedRectangle => {
                geometry::rounded_rect_path(rect, self.style.corner_radius)
            }
            ShapeKind::Ellipse => {
                kurbo::Ellipse::from_rect(rect.into()).to_path(geometry::PATH_TOLERANCE)
            }
            ShapeKind::Arrow => {
                let mut path = BezPath::new();
                path.move_to(self.start);
                path.line_to(self.end);
                self.push_arrow_head(&mut path);
                path
            }
            ShapeKind::CurvedArrow => {
                let control = geometry::control_point_for_curve(self.start, self.end);
                let mut path = BezPath::new();
                path.move_to(self.start);
                path.quad_to(control, self.end);
                self.push_arrow_head(&mut path);
                path
            }
        }
    }

    /// Fill region for closed shapes with fill enabled.
    pub fn fill_path(&self) -> Option<BezPath> {
        (self.is_closed() && self.style.fill_enabled).then(|| self.outline())
    }

    fn push_arrow_head(&self, path: &mut BezPath) {
        if let Some((left, right)) = self.arrow_head() {
            if left == right {
                return;
            }
            path.move_to(left);
            path.line_to(self.end);
            path.line_to(right);
        }
    }
}

impl ArrowRender {
    /// Shaft and head of a resolved arrow.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        match self.path {
            ArrowPath::Line => path.line_to(self.end),
            ArrowPath::Quadratic { control } => path.quad_to(control, self.end),
            ArrowPath::Cubic { c1, c2 } => path.curve_to(c1, c2, self.end),
        }
        if self.head_left != self.head_right {
            path.move_to(self.head_left);
            path.line_to(self.end);
            path.line_to(self.head_right);
        }
        path
    }
}

impl Item {
    /// Path a shell strokes for this item.
    pub fn to_path(&self) -> BezPath {
        match self {
            Item::Stroke(stroke) => stroke.to_path(),
            Item::Shape(shape) => shape.outline(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeStyle;
    use kurbo::PathEl;

    fn shape(kind: ShapeKind, start: Point, end: Point) -> Shape {
        let mut shape = Shape::uncommitted(kind, ShapeStyle::default(), start);
        shape.end = end;
        shape
    }

    #[test]
    fn test_color_conversion() {
        let color = Color::new(10, 20, 30, 40);
        let peniko_color: peniko::Color = color.into();
        assert_eq!(Color::from(peniko_color), color);
    }

    #[test]
    fn test_point_conversion() {
        let p = Point::new(1.5, -2.25);
        let k: kurbo::Point = p.into();
        assert_eq!(k, kurbo::Point::new(1.5, -2.25));
        assert_eq!(Point::from(k), p);
    }

    #[test]
    fn test_rect_conversion_normalizes() {
        let rect = Rect::from(kurbo::Rect::new(10.0, 20.0, 0.0, 5.0));
        assert_eq!(rect, Rect::new(0.0, 5.0, 10.0, 20.0));
    }

    #[test]
    fn test_stroke_path_follows_points() {
        let stroke = Stroke::new(
            Color::black(),
            2.0,
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)],
        )
        .unwrap();
        let elements = stroke.to_path().elements().to_vec();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], PathEl::MoveTo(kurbo::Point::new(0.0, 0.0)));
        assert_eq!(elements[2], PathEl::LineTo(kurbo::Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_single_point_stroke_is_a_dot() {
        let stroke = Stroke::new(Color::black(), 2.0, vec![Point::new(3.0, 3.0)]).unwrap();
        assert_eq!(stroke.to_path().elements().len(), 2);
    }

    #[test]
    fn test_rectangle_outline_bounds() {
        let s = shape(ShapeKind::Rectangle, Point::new(50.0, 40.0), Point::new(10.0, 0.0));
        let bbox = s.outline().bounding_box();
        assert_eq!(bbox, kurbo::Rect::new(10.0, 0.0, 50.0, 40.0));
    }

    #[test]
    fn test_curved_arrow_uses_shared_control_point() {
        let s = shape(ShapeKind::CurvedArrow, Point::new(0.0, 0.0), Point::new(200.0, 0.0));
        let control: kurbo::Point = s.curve_control().unwrap().into();
        let has_quad = s
            .outline()
            .elements()
            .iter()
            .any(|el| matches!(el, PathEl::QuadTo(c, _) if *c == control));
        assert!(has_quad);
    }

    #[test]
    fn test_zero_length_arrow_has_no_head() {
        let s = shape(ShapeKind::Arrow, Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert_eq!(s.outline().elements().len(), 2);
    }

    #[test]
    fn test_routed_arrow_path_is_cubic() {
        let arrow = ArrowRender {
            shape_id: 3,
            style: ShapeStyle::default(),
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            path: ArrowPath::Cubic {
                c1: Point::new(30.0, -40.0),
                c2: Point::new(70.0, -40.0),
            },
            head_left: Point::new(88.0, 6.0),
            head_right: Point::new(88.0, -6.0),
        };
        let elements = arrow.to_path().elements().to_vec();
        assert_eq!(elements.len(), 5);
        assert!(matches!(elements[1], PathEl::CurveTo(..)));
        assert_eq!(elements[3], PathEl::LineTo(kurbo::Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_fill_path_only_for_filled_closed_shapes() {
        let mut s = shape(ShapeKind::Ellipse, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(s.fill_path().is_none());
        s.style = s.style.with_fill(Color::white());
        assert!(s.fill_path().is_some());
        s.kind = ShapeKind::Arrow;
        assert!(s.fill_path().is_none());
    }
}
