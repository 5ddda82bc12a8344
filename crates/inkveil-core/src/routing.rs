//! Arrow endpoint attachment and curved-arrow routing.
//!
//! Arrows whose endpoints are attached to closed shapes are drawn from the
//! target's outline rather than from the stored point. Curved arrows bend
//! around other closed shapes when their default curve would cross one.
//! Hit-testing and the eraser keep using the stored points.

use crate::geometry::{self, Rect};
use crate::shapes::{Attachment, Item, Point, Shape, ShapeId, ShapeKind, ShapeStyle};
use std::cmp::Reverse;

/// Arrows shorter than this after resolving attachments are not drawn.
pub const MIN_ARROW_LENGTH: f32 = 0.5;
/// Samples taken along a candidate curve when counting obstacle hits.
pub const ROUTE_SAMPLES: usize = 800;
/// Samples this close to an endpoint ignore the shapes that endpoint is attached to.
const ENDPOINT_ALLOWANCE: f32 = 14.0;
/// Clearance kept between detour waypoints and obstacles.
const WAYPOINT_MARGIN: f32 = 26.0;
/// Obstacles that contribute detour waypoints, worst offenders first.
const MAX_WAYPOINT_OBSTACLES: usize = 6;
const MAX_WAYPOINTS: usize = 24;
const WAYPOINT_MIN_SPACING: f32 = 3.0;
/// Distance at which a pulled cubic reaches halfway to its waypoint.
const PULL_HALF_DISTANCE: f32 = 140.0;
const PULL_MIN: f32 = 0.50;
const PULL_MAX: f32 = 0.78;
const EPSILON: f32 = 1e-6;

/// Centre line of a resolved arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowPath {
    Line,
    Quadratic { control: Point },
    Cubic { c1: Point, c2: Point },
}

impl ArrowPath {
    /// Point at parameter `t` between `start` and `end`.
    pub fn point_at(&self, start: Point, end: Point, t: f32) -> Point {
        match *self {
            ArrowPath::Line => geometry::quadratic_point(start, start.midpoint(end), end, t),
            ArrowPath::Quadratic { control } => geometry::quadratic_point(start, control, end, t),
            ArrowPath::Cubic { c1, c2 } => cubic_point(start, c1, c2, end, t),
        }
    }

    /// Point the path arrives from at `end`, used to orient the head.
    fn tangent_origin(&self, start: Point) -> Point {
        match *self {
            ArrowPath::Line => start,
            ArrowPath::Quadratic { control } => control,
            ArrowPath::Cubic { c2, .. } => c2,
        }
    }
}

/// An arrow ready to draw: resolved endpoints, centre line and head barbs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowRender {
    pub shape_id: ShapeId,
    pub style: ShapeStyle,
    pub start: Point,
    pub end: Point,
    pub path: ArrowPath,
    pub head_left: Point,
    pub head_right: Point,
}

/// A closed shape arrows can attach to or route around.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Obstacle {
    id: ShapeId,
    kind: ShapeKind,
    rect: Rect,
}

impl Obstacle {
    /// Where the ray from the centre along `(dx, dy)` leaves the outline.
    fn boundary_toward(&self, dx: f32, dy: f32) -> Point {
        match self.kind {
            ShapeKind::Ellipse => intersect_ellipse(self.rect, dx, dy),
            _ => intersect_rect(self.rect, dx, dy),
        }
    }

    fn anchor(&self, attachment: &Attachment, toward: Point) -> Point {
        let center = self.rect.center();
        match attachment.uv {
            Some(uv) => {
                let local = point_from_uv(self.rect, uv);
                let dx = local.x - center.x;
                let dy = local.y - center.y;
                if dx * dx + dy * dy <= EPSILON {
                    return center;
                }
                self.boundary_toward(dx, dy)
            }
            None => self.boundary_toward(toward.x - center.x, toward.y - center.y),
        }
    }
}

fn obstacles(items: &[Item]) -> Vec<Obstacle> {
    items
        .iter()
        .filter_map(Item::as_shape)
        .filter(|shape| shape.is_closed())
        .map(|shape| Obstacle {
            id: shape.id,
            kind: shape.kind,
            rect: shape.bounds(),
        })
        .collect()
}

fn length(dx: f32, dy: f32) -> f32 {
    (dx * dx + dy * dy).sqrt()
}

fn intersect_rect(rect: Rect, dx: f32, dy: f32) -> Point {
    let center = rect.center();
    let sx = rect.width() * 0.5 / dx.abs().max(EPSILON);
    let sy = rect.height() * 0.5 / dy.abs().max(EPSILON);
    let s = sx.min(sy);
    Point::new(center.x + dx * s, center.y + dy * s)
}

fn intersect_ellipse(rect: Rect, dx: f32, dy: f32) -> Point {
    let center = rect.center();
    let rx = (rect.width() * 0.5).max(EPSILON);
    let ry = (rect.height() * 0.5).max(EPSILON);
    let s = (dx.abs() / rx).max(EPSILON).max((dy.abs() / ry).max(EPSILON));
    Point::new(center.x + dx / s, center.y + dy / s)
}

fn point_from_uv(rect: Rect, uv: Point) -> Point {
    Point::new(
        rect.min_x + uv.x.clamp(0.0, 1.0) * rect.width(),
        rect.min_y + uv.y.clamp(0.0, 1.0) * rect.height(),
    )
}

/// Point on a cubic Bézier at parameter `t`.
pub fn cubic_point(start: Point, c1: Point, c2: Point, end: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * start.x + b * c1.x + c * c2.x + d * end.x,
        a * start.y + b * c1.y + c * c2.y + d * end.y,
    )
}

/// Controls of the symmetric cubic that passes through `waypoint` at `t = 0.5`.
fn cubic_through(start: Point, end: Point, waypoint: Point) -> (Point, Point) {
    let k = 4.0 / 3.0;
    (
        Point::new(start.x + (waypoint.x - start.x) * k, start.y + (waypoint.y - start.y) * k),
        Point::new(end.x + (waypoint.x - end.x) * k, end.y + (waypoint.y - end.y) * k),
    )
}

/// Controls pulled part of the way toward `waypoint`; longer detours pull harder.
fn cubic_pulled(start: Point, end: Point, waypoint: Point) -> (Point, Point) {
    let d = (length(waypoint.x - start.x, waypoint.y - start.y)
        + length(waypoint.x - end.x, waypoint.y - end.y))
    .max(EPSILON);
    let a = (d / (d + PULL_HALF_DISTANCE)).clamp(PULL_MIN, PULL_MAX);
    (
        Point::new(start.x + (waypoint.x - start.x) * a, start.y + (waypoint.y - start.y) * a),
        Point::new(end.x + (waypoint.x - end.x) * a, end.y + (waypoint.y - end.y) * a),
    )
}

/// Samples of the curve that fall inside an obstacle: per obstacle, and total.
fn count_hits(
    start: Point,
    end: Point,
    attached: &[ShapeId],
    obstacles: &[Obstacle],
    point_at: impl Fn(f32) -> Point,
) -> (Vec<(ShapeId, usize)>, usize) {
    let mut by_id: Vec<(ShapeId, usize)> = Vec::new();
    let mut total = 0;

    for i in 0..=ROUTE_SAMPLES {
        let p = point_at(i as f32 / ROUTE_SAMPLES as f32);
        let near_endpoint = length(p.x - start.x, p.y - start.y) <= ENDPOINT_ALLOWANCE
            || length(p.x - end.x, p.y - end.y) <= ENDPOINT_ALLOWANCE;

        for obstacle in obstacles {
            if near_endpoint && attached.contains(&obstacle.id) {
                continue;
            }
            if !obstacle.rect.contains(p) {
                continue;
            }
            total += 1;
            match by_id.iter_mut().find(|(id, _)| *id == obstacle.id) {
                Some((_, count)) => *count += 1,
                None => by_id.push((obstacle.id, 1)),
            }
        }
    }

    (by_id, total)
}

fn waypoint_candidates(start: Point, end: Point, obstacles: &[Obstacle]) -> Vec<Point> {
    let margin = WAYPOINT_MARGIN;
    let mid = start.midpoint(end);
    let mut union: Option<Rect> = None;
    let mut points = Vec::new();

    for obstacle in obstacles.iter().take(MAX_WAYPOINT_OBSTACLES) {
        let r = obstacle.rect.inflate(margin, margin);
        union = Some(union.map_or(r, |u| u.union(r)));
        let cx = (r.min_x + r.max_x) * 0.5;
        let cy = (r.min_y + r.max_y) * 0.5;

        points.extend([
            // edge midpoints
            Point::new(cx, r.min_y - margin),
            Point::new(cx, r.max_y + margin),
            Point::new(r.min_x - margin, cy),
            Point::new(r.max_x + margin, cy),
            // corners
            Point::new(r.min_x - margin, r.min_y - margin),
            Point::new(r.max_x + margin, r.min_y - margin),
            Point::new(r.min_x - margin, r.max_y + margin),
            Point::new(r.max_x + margin, r.max_y + margin),
            // above and below the chord midpoint
            Point::new(mid.x, r.min_y - margin),
            Point::new(mid.x, r.max_y + margin),
        ]);
    }

    if let Some(u) = union {
        let cx = (u.min_x + u.max_x) * 0.5;
        let cy = (u.min_y + u.max_y) * 0.5;
        points.extend([
            Point::new(cx, u.min_y - margin * 2.0),
            Point::new(cx, u.max_y + margin * 2.0),
            Point::new(u.min_x - margin * 2.0, cy),
            Point::new(u.max_x + margin * 2.0, cy),
        ]);
    }

    points.retain(|p| {
        !obstacles
            .iter()
            .any(|o| o.rect.inflate(margin, margin).contains(*p))
    });

    let mut out: Vec<Point> = Vec::new();
    for p in points {
        let spaced = out
            .iter()
            .all(|q| length(q.x - p.x, q.y - p.y) >= WAYPOINT_MIN_SPACING);
        if spaced {
            out.push(p);
            if out.len() >= MAX_WAYPOINTS {
                break;
            }
        }
    }
    out
}

/// Keep the default curve if it is clear, otherwise try cubic detours
/// through waypoints around the obstacles it crosses.
fn route_curve(
    start: Point,
    end: Point,
    control: Point,
    attached: &[ShapeId],
    obstacles: &[Obstacle],
) -> ArrowPath {
    let default = ArrowPath::Quadratic { control };
    let (hits_by_id, default_hits) = count_hits(start, end, attached, obstacles, |t| {
        geometry::quadratic_point(start, control, end, t)
    });
    if default_hits == 0 {
        return default;
    }

    let mut ordered = obstacles.to_vec();
    ordered.sort_by_key(|o| {
        Reverse(
            hits_by_id
                .iter()
                .find(|(id, _)| *id == o.id)
                .map_or(0, |(_, count)| *count),
        )
    });

    let mut best: Option<(ArrowPath, usize, f32)> = None;
    for waypoint in waypoint_candidates(start, end, &ordered) {
        for (c1, c2) in [
            cubic_through(start, end, waypoint),
            cubic_pulled(start, end, waypoint),
        ] {
            let (_, hits) = count_hits(start, end, attached, obstacles, |t| {
                cubic_point(start, c1, c2, end, t)
            });
            let path = ArrowPath::Cubic { c1, c2 };
            if hits == 0 {
                return path;
            }

            let score = length(c1.x - start.x, c1.y - start.y) + length(c2.x - end.x, c2.y - end.y);
            let better = match best {
                None => true,
                Some((_, best_hits, best_score)) => {
                    hits < best_hits || (hits == best_hits && score < best_score)
                }
            };
            if better {
                best = Some((path, hits, score));
            }
        }
    }

    match best {
        Some((path, hits, _)) if hits < default_hits => path,
        _ => default,
    }
}

/// Endpoints after applying attachments, plus the ids actually attached.
fn resolve_endpoints(shape: &Shape, obstacles: &[Obstacle]) -> (Point, Point, Vec<ShapeId>) {
    let find = |attachment: &Option<Attachment>| {
        attachment.and_then(|a| {
            obstacles
                .iter()
                .find(|o| o.id == a.shape_id)
                .map(|o| (*o, a))
        })
    };

    let mut start = shape.start;
    let mut end = shape.end;
    let mut attached = Vec::new();

    if let Some((target, attachment)) = find(&shape.start_attach) {
        attached.push(target.id);
        start = target.anchor(&attachment, end);
    }
    if let Some((target, attachment)) = find(&shape.end_attach) {
        if !attached.contains(&target.id) {
            attached.push(target.id);
        }
        end = target.anchor(&attachment, start);
    }

    (start, end, attached)
}

fn render_arrow(shape: &Shape, obstacles: &[Obstacle]) -> Option<ArrowRender> {
    let (start, end, attached) = resolve_endpoints(shape, obstacles);
    if length(end.x - start.x, end.y - start.y) <= MIN_ARROW_LENGTH {
        return None;
    }

    let path = match shape.kind {
        ShapeKind::CurvedArrow => {
            let control = geometry::control_point_for_curve(start, end);
            route_curve(start, end, control, &attached, obstacles)
        }
        _ => ArrowPath::Line,
    };
    let (head_left, head_right) =
        geometry::arrow_head(path.tangent_origin(start), end, shape.style.stroke_width);

    Some(ArrowRender {
        shape_id: shape.id,
        style: shape.style,
        start,
        end,
        path,
        head_left,
        head_right,
    })
}

/// Resolve every arrow in `items`, in paint order. Arrows that collapse to
/// (almost) nothing are skipped.
pub fn render_arrows(items: &[Item]) -> Vec<ArrowRender> {
    let obstacles = obstacles(items);
    items
        .iter()
        .filter_map(Item::as_shape)
        .filter(|shape| matches!(shape.kind, ShapeKind::Arrow | ShapeKind::CurvedArrow))
        .filter_map(|shape| render_arrow(shape, &obstacles))
        .collect()
}

/// Closed shapes the arrow `arrow_id` routes around, sorted by id. Shapes it
/// is attached to are excluded. Empty if `arrow_id` is not an arrow.
pub fn arrow_obstacle_ids(items: &[Item], arrow_id: ShapeId) -> Vec<ShapeId> {
    let obstacles = obstacles(items);
    let Some(arrow) = items
        .iter()
        .filter_map(Item::as_shape)
        .find(|shape| shape.id == arrow_id)
    else {
        return Vec::new();
    };
    if !matches!(arrow.kind, ShapeKind::Arrow | ShapeKind::CurvedArrow) {
        return Vec::new();
    }

    let (_, _, attached) = resolve_endpoints(arrow, &obstacles);
    let mut ids: Vec<ShapeId> = obstacles
        .iter()
        .map(|o| o.id)
        .filter(|id| !attached.contains(id))
        .collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(id: ShapeId, kind: ShapeKind, start: (f32, f32), end: (f32, f32)) -> Shape {
        let mut shape = Shape::uncommitted(kind, ShapeStyle::default(), Point::new(start.0, start.1));
        shape.id = id;
        shape.end = Point::new(end.0, end.1);
        shape
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_unattached_arrow_keeps_points() {
        let items = vec![Item::Shape(shape(1, ShapeKind::Arrow, (0.0, 0.0), (100.0, 0.0)))];
        let arrows = render_arrows(&items);
        assert_eq!(arrows.len(), 1);
        let arrow = arrows[0];
        assert_eq!(arrow.path, ArrowPath::Line);
        assert_eq!(arrow.start, Point::new(0.0, 0.0));
        assert_eq!(arrow.end, Point::new(100.0, 0.0));
        // head barbs sit behind the tip
        assert!(arrow.head_left.x < 100.0 && arrow.head_right.x < 100.0);
        assert!(close(arrow.head_left.midpoint(arrow.head_right), Point::new(88.0, 0.0)));
    }

    #[test]
    fn test_start_attached_to_rectangle_edge() {
        let mut arrow = shape(2, ShapeKind::Arrow, (50.0, 50.0), (300.0, 50.0));
        arrow.start_attach = Some(Attachment::new(1));
        let items = vec![
            Item::Shape(shape(1, ShapeKind::Rectangle, (0.0, 0.0), (100.0, 100.0))),
            Item::Shape(arrow),
        ];
        let arrows = render_arrows(&items);
        assert!(close(arrows[0].start, Point::new(100.0, 50.0)));
        assert_eq!(arrows[0].end, Point::new(300.0, 50.0));
    }

    #[test]
    fn test_end_anchored_on_ellipse_by_uv() {
        let mut arrow = shape(2, ShapeKind::Arrow, (400.0, 400.0), (0.0, 0.0));
        arrow.end_attach = Some(Attachment::at(1, Point::new(1.0, 0.5)));
        let items = vec![
            Item::Shape(shape(1, ShapeKind::Ellipse, (0.0, 0.0), (200.0, 100.0))),
            Item::Shape(arrow),
        ];
        let arrows = render_arrows(&items);
        assert!(close(arrows[0].end, Point::new(200.0, 50.0)));
    }

    #[test]
    fn test_centre_uv_anchors_at_centre() {
        let mut arrow = shape(2, ShapeKind::Arrow, (400.0, 400.0), (0.0, 0.0));
        arrow.end_attach = Some(Attachment::at(1, Point::new(0.5, 0.5)));
        let items = vec![
            Item::Shape(shape(1, ShapeKind::Rectangle, (0.0, 0.0), (100.0, 60.0))),
            Item::Shape(arrow),
        ];
        assert_eq!(render_arrows(&items)[0].end, Point::new(50.0, 30.0));
    }

    #[test]
    fn test_missing_target_falls_back_to_points() {
        let mut arrow = shape(2, ShapeKind::Arrow, (0.0, 0.0), (100.0, 0.0));
        arrow.start_attach = Some(Attachment::new(9));
        arrow.end_attach = Some(Attachment::new(2));
        let items = vec![Item::Shape(arrow)];
        let arrows = render_arrows(&items);
        assert_eq!(arrows[0].start, Point::new(0.0, 0.0));
        assert_eq!(arrows[0].end, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_collapsed_arrow_is_skipped() {
        let mut arrow = shape(2, ShapeKind::Arrow, (50.0, 50.0), (50.0, 50.0));
        arrow.start_attach = Some(Attachment::at(1, Point::new(0.5, 0.5)));
        arrow.end_attach = Some(Attachment::at(1, Point::new(0.5, 0.5)));
        let items = vec![
            Item::Shape(shape(1, ShapeKind::Rectangle, (0.0, 0.0), (100.0, 100.0))),
            Item::Shape(arrow),
        ];
        assert!(render_arrows(&items).is_empty());
    }

    #[test]
    fn test_clear_curve_stays_quadratic() {
        let items = vec![
            Item::Shape(shape(1, ShapeKind::Rectangle, (0.0, 300.0), (50.0, 350.0))),
            Item::Shape(shape(2, ShapeKind::CurvedArrow, (0.0, 0.0), (400.0, 0.0))),
        ];
        let arrow = render_arrows(&items)[0];
        let control = geometry::control_point_for_curve(arrow.start, arrow.end);
        assert_eq!(arrow.path, ArrowPath::Quadratic { control });
    }

    #[test]
    fn test_blocked_curve_detours_around_obstacle() {
        let obstacle = Rect::new(150.0, 20.0, 250.0, 70.0);
        let items = vec![
            Item::Shape(shape(1, ShapeKind::Rectangle, (150.0, 20.0), (250.0, 70.0))),
            Item::Shape(shape(2, ShapeKind::CurvedArrow, (0.0, 0.0), (400.0, 0.0))),
        ];
        // the default curve bulges through the rectangle
        let control = geometry::control_point_for_curve(Point::new(0.0, 0.0), Point::new(400.0, 0.0));
        assert!(obstacle.contains(geometry::quadratic_point(
            Point::new(0.0, 0.0),
            control,
            Point::new(400.0, 0.0),
            0.5
        )));

        let arrow = render_arrows(&items)[0];
        assert!(matches!(arrow.path, ArrowPath::Cubic { .. }));
        for i in 0..=100 {
            let p = arrow.path.point_at(arrow.start, arrow.end, i as f32 / 100.0);
            assert!(!obstacle.contains(p), "curve enters obstacle at {:?}", p);
        }
    }

    #[test]
    fn test_obstacle_ids_exclude_attached() {
        let mut arrow = shape(4, ShapeKind::CurvedArrow, (0.0, 0.0), (500.0, 0.0));
        arrow.end_attach = Some(Attachment::new(3));
        let items = vec![
            Item::Shape(shape(3, ShapeKind::Ellipse, (450.0, -20.0), (550.0, 20.0))),
            Item::Shape(shape(1, ShapeKind::Rectangle, (0.0, 100.0), (10.0, 110.0))),
            Item::Shape(arrow),
            Item::Shape(shape(5, ShapeKind::Arrow, (0.0, 0.0), (1.0, 1.0))),
        ];
        assert_eq!(arrow_obstacle_ids(&items, 4), vec![1]);
        assert!(arrow_obstacle_ids(&items, 1).is_empty());
        assert!(arrow_obstacle_ids(&items, 42).is_empty());
    }
}
