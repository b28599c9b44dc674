use super::cfg::{DET_EPS, GRAZE_EPS, LOS_START_SKIP, ON_BOUNDARY_EPS, PARAM_EPS};
use super::polygon::Polygon;
use crate::Point2;

/// z-component of the 2D cross product.
#[inline]
pub fn cross(a: Point2, b: Point2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// `v` rotated by +90°.
#[inline]
pub fn left_perp(v: Point2) -> Point2 {
    Point2::new(-v.y, v.x)
}

/// `v` rotated by −90°.
#[inline]
pub fn right_perp(v: Point2) -> Point2 {
    Point2::new(v.y, -v.x)
}

/// Projection parameter of `p` onto the segment `v→w`, clamped to [0,1].
/// A degenerate segment yields 0.
#[inline]
pub fn segment_param(p: Point2, v: Point2, w: Point2) -> f64 {
    let vw = w - v;
    let len2 = vw.norm_squared();
    if len2 <= 0.0 {
        return 0.0;
    }
    ((p - v).dot(&vw) / len2).clamp(0.0, 1.0)
}

/// Closest point to `p` on the segment `v→w` and its distance.
pub fn closest_point_on_segment(p: Point2, v: Point2, w: Point2) -> (Point2, f64) {
    let t = segment_param(p, v, w);
    let q = v + (w - v) * t;
    (q, (p - q).norm())
}

/// Nearest point on a polygon boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryPoint {
    pub point: Point2,
    pub distance: f64,
    /// Edge `edge` runs from vertex `edge` to vertex `edge + 1`.
    pub edge: usize,
    /// Projection parameter along that edge, in [0,1].
    pub param: f64,
}

/// Closest boundary point of `poly` to `p`; ties go to the lowest edge index.
pub fn closest_point_on_polygon(p: Point2, poly: &Polygon) -> BoundaryPoint {
    let mut best = BoundaryPoint {
        point: poly.vertex(0),
        distance: f64::INFINITY,
        edge: 0,
        param: 0.0,
    };
    for (i, (a, b)) in poly.edges().enumerate() {
        let t = segment_param(p, a, b);
        let q = a + (b - a) * t;
        let d = (p - q).norm();
        if d < best.distance {
            best = BoundaryPoint {
                point: q,
                distance: d,
                edge: i,
                param: t,
            };
        }
    }
    best
}

/// Inside or on the boundary (crossing-number test).
pub fn point_in_polygon(p: Point2, poly: &Polygon) -> bool {
    if closest_point_on_polygon(p, poly).distance <= ON_BOUNDARY_EPS {
        return true;
    }
    let mut inside = false;
    for (a, b) in poly.edges() {
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Intersection point of the segments `p1→p2` and `q1→q2`, if any.
///
/// Parallel and collinear pairs (`|det| < DET_EPS`) report no intersection.
pub fn segments_intersect(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> Option<Point2> {
    let r = p2 - p1;
    let s = q2 - q1;
    let det = cross(r, s);
    if det.abs() < DET_EPS {
        return None;
    }
    let qp = q1 - p1;
    let t = cross(qp, s) / det;
    let u = cross(qp, r) / det;
    let range = -PARAM_EPS..=1.0 + PARAM_EPS;
    if !range.contains(&t) || !range.contains(&u) {
        return None;
    }
    Some(p1 + r * t.clamp(0.0, 1.0))
}

/// Minimum distance between the segments `a→b` and `c→d`.
pub fn segment_distance(a: Point2, b: Point2, c: Point2, d: Point2) -> f64 {
    if segments_intersect(a, b, c, d).is_some() {
        return 0.0;
    }
    let d1 = closest_point_on_segment(a, c, d).1;
    let d2 = closest_point_on_segment(b, c, d).1;
    let d3 = closest_point_on_segment(c, a, b).1;
    let d4 = closest_point_on_segment(d, a, b).1;
    d1.min(d2).min(d3).min(d4)
}

/// Distance from the segment `a→b` to the polygon region (0 when they overlap).
pub fn segment_polygon_distance(a: Point2, b: Point2, poly: &Polygon) -> f64 {
    if point_in_polygon(a, poly) {
        return 0.0;
    }
    poly.edges()
        .map(|(c, d)| segment_distance(a, b, c, d))
        .fold(f64::INFINITY, f64::min)
}

/// Start of the part of `a→b` that is tested for contact.
#[inline]
pub(crate) fn swept_origin(a: Point2, b: Point2) -> Point2 {
    let len = (b - a).norm();
    if len <= LOS_START_SKIP {
        b
    } else {
        a + (b - a) * (LOS_START_SKIP / len)
    }
}

/// Whether the swept segment `from→to` touches `poly` inflated by `clearance`.
#[inline]
pub(crate) fn segment_blocked(from: Point2, to: Point2, poly: &Polygon, clearance: f64) -> bool {
    segment_polygon_distance(from, to, poly) <= clearance + GRAZE_EPS
}

/// True iff `a→b` stays clear of every polygon inflated by `clearance`.
///
/// Grazing counts as blocked. `a` itself may sit on an inflated boundary:
/// only the segment after a short prefix is tested.
pub fn line_of_sight(a: Point2, b: Point2, polygons: &[Polygon], clearance: f64) -> bool {
    let from = swept_origin(a, b);
    polygons
        .iter()
        .all(|poly| !segment_blocked(from, b, poly, clearance))
}
