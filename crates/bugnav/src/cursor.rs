//! Boundary cursor: a walker on the clearance-offset boundary of the obstacles.
//!
//! The walk is a sequence of pieces:
//! - edge runs, at `edgeStart + progress·edgeDir + normal·clearance` while the
//!   foot slides along one polygon edge;
//! - corner arcs of radius `clearance` around a convex vertex, joining one
//!   edge run to the next.
//!
//! A piece ends naturally (edge end, or the arc meets the next edge's offset
//! line) or earlier, when the walk would enter the clearance band of another
//! edge or vertex of any polygon: an adjacent edge at a concave corner, the
//! far wall of a channel narrower than `2·clearance`, or a neighbouring
//! obstacle whose inflation overlaps. The cursor then continues on that
//! feature from the entry point. The obstacle is always kept on the same
//! `Hand`, and the world position never comes closer than `clearance` to any
//! polygon.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geom::{left_perp, right_perp, Polygon};
use crate::obstacles::ObstacleSet;
use crate::Point2;

/// Offset radius floor; a zero clearance walks this close to the boundary.
const MIN_WALK_RADIUS: f64 = 1e-9;
/// Events up to this far behind the current point still count, at zero.
const EVENT_EPS: f64 = 1e-9;
/// A contact projecting this close to an edge end starts on the vertex arc.
const VERTEX_PARAM_EPS: f64 = 1e-9;
const SLOPE_EPS: f64 = 1e-12;
const ANGLE_EPS: f64 = 1e-9;
/// Relative discriminant under which a disk is only touched, not entered.
const TOUCH_EPS: f64 = 1e-12;

/// Edge index order in which a polygon is walked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Traversal {
    /// Increasing edge index.
    Forward,
    /// Decreasing edge index.
    Backward,
}

impl Traversal {
    /// `+1` for increasing index order, `-1` otherwise.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Traversal::Forward => 1,
            Traversal::Backward => -1,
        }
    }
}

/// Side on which the obstacle is kept while walking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hand {
    /// Obstacle on the left: counter-clockwise around it.
    Left,
    /// Obstacle on the right: clockwise around it.
    Right,
}

impl Hand {
    /// Hand that visits `poly`'s edges in the given index order from outside.
    pub fn for_traversal(poly: &Polygon, traversal: Traversal) -> Self {
        // a ccw polygon has its interior left of every edge
        match (poly.is_ccw(), traversal) {
            (true, Traversal::Forward) | (false, Traversal::Backward) => Hand::Left,
            _ => Hand::Right,
        }
    }

    /// Hand for a rotational sense around the obstacle.
    pub fn for_rotation(counter_clockwise: bool) -> Self {
        if counter_clockwise {
            Hand::Left
        } else {
            Hand::Right
        }
    }

    /// Index order this hand produces on `poly`.
    pub fn traversal_on(self, poly: &Polygon) -> Traversal {
        if Hand::for_traversal(poly, Traversal::Forward) == self {
            Traversal::Forward
        } else {
            Traversal::Backward
        }
    }

    /// Angular sense around a vertex.
    #[inline]
    fn sigma(self) -> f64 {
        match self {
            Hand::Left => 1.0,
            Hand::Right => -1.0,
        }
    }

    /// Free-side normal when walking along `dir`.
    #[inline]
    fn free_normal(self, dir: Point2) -> Point2 {
        match self {
            Hand::Left => right_perp(dir),
            Hand::Right => left_perp(dir),
        }
    }

    /// Walking direction along a face whose free-side normal is `normal`.
    #[inline]
    fn walk_dir(self, normal: Point2) -> Point2 {
        match self {
            Hand::Left => left_perp(normal),
            Hand::Right => right_perp(normal),
        }
    }
}

/// Where the cursor currently is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Location {
    /// On the offset of `edge`; `progress` is measured from the edge end the
    /// walk entered at.
    Edge {
        obstacle: usize,
        edge: usize,
        progress: f64,
    },
    /// On the arc around `vertex`; `angle` is the direction from the vertex.
    Corner {
        obstacle: usize,
        vertex: usize,
        angle: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EdgeRun {
    obstacle: usize,
    edge: usize,
    forward: bool,
    start: Point2,
    dir: Point2,
    normal: Point2,
    length: f64,
    progress: f64,
}

impl EdgeRun {
    fn new(poly: &Polygon, obstacle: usize, edge: usize, forward: bool, hand: Hand) -> Self {
        let (a, b) = poly.edge(edge);
        let (start, end) = if forward { (a, b) } else { (b, a) };
        let length = (end - start).norm();
        let dir = (end - start) / length;
        Self {
            obstacle,
            edge,
            forward,
            start,
            dir,
            normal: hand.free_normal(dir),
            length,
            progress: 0.0,
        }
    }

    fn end_vertex(&self, vertex_count: usize) -> usize {
        if self.forward {
            (self.edge + 1) % vertex_count
        } else {
            self.edge
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CornerArc {
    obstacle: usize,
    vertex: usize,
    center: Point2,
    theta: f64,
    /// Radians left until the arc meets the exit edge's offset line.
    sweep_left: f64,
    exit_edge: usize,
    exit_forward: bool,
}

impl CornerArc {
    /// Arc around `vertex` starting at angle `theta`. The exit is the incident
    /// edge whose offset line is met first; `came_from` is never an exit.
    fn new(
        poly: &Polygon,
        obstacle: usize,
        vertex: usize,
        theta: f64,
        hand: Hand,
        came_from: Option<usize>,
    ) -> Self {
        let sigma = hand.sigma();
        let (sweep_left, exit_edge, exit_forward) =
            [(vertex, true), (poly.prev_edge(vertex), false)]
                .into_iter()
                .filter(|(edge, _)| Some(*edge) != came_from)
                .map(|(edge, forward)| {
                    let (a, b) = poly.edge(edge);
                    let away = if forward { b - a } else { a - b };
                    let n = hand.free_normal(away / away.norm());
                    (ahead(theta, n.y.atan2(n.x), sigma), edge, forward)
                })
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .unwrap_or((0.0, vertex, true));
        Self {
            obstacle,
            vertex,
            center: poly.vertex(vertex),
            theta,
            sweep_left,
            exit_edge,
            exit_forward,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Piece {
    Edge(EdgeRun),
    Corner(CornerArc),
}

/// A clearance band the walk runs into.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Feature {
    Edge {
        obstacle: usize,
        edge: usize,
        normal: Point2,
    },
    Vertex {
        obstacle: usize,
        vertex: usize,
    },
}

#[derive(Clone, Debug)]
pub struct BoundaryCursor {
    hand: Hand,
    traversal: Traversal,
    clearance: f64,
    piece: Piece,
    origin: Point2,
    origin_heading: Point2,
}

impl BoundaryCursor {
    /// Place the cursor against `obstacle` next to `contact`.
    ///
    /// The nearest edge (lowest index on ties) fixes the start; the free side
    /// is the side `contact` is on, so the cursor never jumps across a thin
    /// obstacle. A contact whose nearest boundary point is a vertex starts on
    /// that vertex's arc.
    pub fn initialize(
        obstacles: &ObstacleSet,
        obstacle: usize,
        contact: Point2,
        hand: Hand,
    ) -> Self {
        let poly = obstacles.polygon(obstacle);
        let clearance = obstacles.clearance().max(MIN_WALK_RADIUS);
        let bp = poly.closest_point(contact);
        let (a, b) = poly.edge(bp.edge);
        let t = (b - a) / (b - a).norm();
        let away = contact - bp.point;
        let normal = if away.norm() > MIN_WALK_RADIUS {
            away / away.norm()
        } else if poly.is_ccw() {
            right_perp(t)
        } else {
            left_perp(t)
        };

        let piece = if bp.param > VERTEX_PARAM_EPS && bp.param < 1.0 - VERTEX_PARAM_EPS {
            let forward = hand.walk_dir(normal).dot(&t) > 0.0;
            let mut run = EdgeRun::new(poly, obstacle, bp.edge, forward, hand);
            run.progress = (bp.point - run.start).dot(&run.dir).clamp(0.0, run.length);
            Piece::Edge(run)
        } else {
            let vertex = if bp.param <= VERTEX_PARAM_EPS {
                bp.edge
            } else {
                (bp.edge + 1) % poly.len()
            };
            let theta = normal.y.atan2(normal.x);
            Piece::Corner(CornerArc::new(poly, obstacle, vertex, theta, hand, None))
        };

        let mut cursor = Self {
            hand,
            traversal: hand.traversal_on(poly),
            clearance,
            piece,
            origin: Point2::zeros(),
            origin_heading: Point2::zeros(),
        };
        cursor.origin = cursor.position();
        cursor.origin_heading = cursor.heading();
        cursor
    }

    /// Walk `arc` along the offset boundary and return the new world point.
    pub fn advance(&mut self, obstacles: &ObstacleSet, arc: f64) -> Point2 {
        let mut left = arc.max(0.0);
        let budget = 8 + 4 * obstacles.vertex_count();
        let mut switches = 0usize;
        while left > 0.0 {
            if switches > budget {
                warn!(left, switches, "cursor stalled between features");
                break;
            }
            let room = self.room();
            match self.first_intrusion(obstacles, left.min(room)) {
                Some((s, feature)) => {
                    self.slide(s);
                    left -= s;
                    self.enter(obstacles, feature);
                    switches += 1;
                }
                None if left < room => {
                    self.slide(left);
                    left = 0.0;
                }
                None => {
                    self.slide(room);
                    left -= room;
                    self.turn_corner(obstacles);
                    switches += 1;
                }
            }
        }
        self.position()
    }

    pub fn position(&self) -> Point2 {
        match self.piece {
            Piece::Edge(r) => r.start + r.dir * r.progress + r.normal * self.clearance,
            Piece::Corner(c) => c.center + unit(c.theta) * self.clearance,
        }
    }

    /// Unit direction of travel.
    pub fn heading(&self) -> Point2 {
        match self.piece {
            Piece::Edge(r) => r.dir,
            Piece::Corner(c) => left_perp(unit(c.theta)) * self.hand.sigma(),
        }
    }

    pub fn location(&self) -> Location {
        match self.piece {
            Piece::Edge(r) => Location::Edge {
                obstacle: r.obstacle,
                edge: r.edge,
                progress: r.progress,
            },
            Piece::Corner(c) => Location::Corner {
                obstacle: c.obstacle,
                vertex: c.vertex,
                angle: c.theta,
            },
        }
    }

    /// Obstacle currently followed (may change across overlapping inflations).
    pub fn obstacle(&self) -> usize {
        match self.piece {
            Piece::Edge(r) => r.obstacle,
            Piece::Corner(c) => c.obstacle,
        }
    }

    #[inline]
    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Index order on the polygon the cursor was initialized against.
    #[inline]
    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Back within `tol` of the first point, heading the same way.
    pub fn revisits_origin(&self, tol: f64) -> bool {
        (self.position() - self.origin).norm() < tol
            && self.heading().dot(&self.origin_heading) > 0.0
    }

    fn room(&self) -> f64 {
        match self.piece {
            Piece::Edge(r) => (r.length - r.progress).max(0.0),
            Piece::Corner(c) => c.sweep_left * self.clearance,
        }
    }

    fn slide(&mut self, s: f64) {
        let sigma = self.hand.sigma();
        match &mut self.piece {
            Piece::Edge(r) => r.progress = (r.progress + s).min(r.length),
            Piece::Corner(c) => {
                let delta = s / self.clearance;
                c.theta += sigma * delta;
                c.sweep_left = (c.sweep_left - delta).max(0.0);
            }
        }
    }

    /// Natural end of the current piece.
    fn turn_corner(&mut self, obstacles: &ObstacleSet) {
        match self.piece {
            Piece::Edge(r) => {
                let poly = obstacles.polygon(r.obstacle);
                let vertex = r.end_vertex(poly.len());
                let theta = r.normal.y.atan2(r.normal.x);
                let arc = CornerArc::new(poly, r.obstacle, vertex, theta, self.hand, Some(r.edge));
                if arc.sweep_left > PI + ANGLE_EPS {
                    // reflex corner the band test missed: jump to where the offset lines cross
                    let turn = TAU - arc.sweep_left;
                    let mut next =
                        EdgeRun::new(poly, r.obstacle, arc.exit_edge, arc.exit_forward, self.hand);
                    next.progress = (self.clearance * (0.5 * turn).tan()).min(next.length);
                    self.piece = Piece::Edge(next);
                } else {
                    self.piece = Piece::Corner(arc);
                }
            }
            Piece::Corner(c) => {
                let poly = obstacles.polygon(c.obstacle);
                self.piece = Piece::Edge(EdgeRun::new(
                    poly,
                    c.obstacle,
                    c.exit_edge,
                    c.exit_forward,
                    self.hand,
                ));
            }
        }
    }

    /// Continue on `feature` from the current point.
    fn enter(&mut self, obstacles: &ObstacleSet, feature: Feature) {
        let p = self.position();
        match feature {
            Feature::Vertex { obstacle, vertex } => {
                let poly = obstacles.polygon(obstacle);
                let radial = p - poly.vertex(vertex);
                let theta = radial.y.atan2(radial.x);
                let arc = CornerArc::new(poly, obstacle, vertex, theta, self.hand, None);
                self.piece = Piece::Corner(arc);
            }
            Feature::Edge {
                obstacle,
                edge,
                normal,
            } => {
                let poly = obstacles.polygon(obstacle);
                let (a, b) = poly.edge(edge);
                let forward = self.hand.walk_dir(normal).dot(&(b - a)) > 0.0;
                let mut run = EdgeRun::new(poly, obstacle, edge, forward, self.hand);
                run.progress = (p - run.start).dot(&run.dir).clamp(0.0, run.length);
                self.piece = Piece::Edge(run);
            }
        }
    }

    /// Earliest entry, within `limit` arc length, into a band the current
    /// piece does not itself belong to.
    fn first_intrusion(&self, obstacles: &ObstacleSet, limit: f64) -> Option<(f64, Feature)> {
        let c = self.clearance;
        let sigma = self.hand.sigma();
        let mut best: Option<(f64, Feature)> = None;
        let mut consider = |s: f64, feature: Feature| {
            if s <= limit && best.map_or(true, |(b, _)| s < b) {
                best = Some((s, feature));
            }
        };

        match self.piece {
            Piece::Edge(r) => {
                let p0 = self.position();
                for (oi, poly) in obstacles.polygons().iter().enumerate() {
                    let n = poly.len();
                    let own = oi == r.obstacle;
                    for vi in 0..n {
                        if own && (vi == r.edge || vi == (r.edge + 1) % n) {
                            continue;
                        }
                        if let Some(s) = line_disk_entry(p0, r.dir, poly.vertex(vi), c) {
                            consider(s, Feature::Vertex { obstacle: oi, vertex: vi });
                        }
                    }
                    for ei in 0..n {
                        if own && ei == r.edge {
                            continue;
                        }
                        let (a, b) = poly.edge(ei);
                        if let Some((s, normal)) = line_band_entry(p0, r.dir, a, b, c) {
                            consider(
                                s,
                                Feature::Edge {
                                    obstacle: oi,
                                    edge: ei,
                                    normal,
                                },
                            );
                        }
                    }
                }
            }
            Piece::Corner(k) => {
                for (oi, poly) in obstacles.polygons().iter().enumerate() {
                    let own = oi == k.obstacle;
                    for vi in 0..poly.len() {
                        if own && vi == k.vertex {
                            continue;
                        }
                        let q = poly.vertex(vi);
                        if let Some(delta) = arc_disk_entry(k.center, k.theta, sigma, c, q) {
                            consider(delta * c, Feature::Vertex { obstacle: oi, vertex: vi });
                        }
                    }
                    for ei in 0..poly.len() {
                        if own && (ei == k.vertex || ei == poly.prev_edge(k.vertex)) {
                            continue;
                        }
                        let (a, b) = poly.edge(ei);
                        let entry = arc_band_entry(k.center, k.theta, sigma, c, a, b);
                        if let Some((delta, normal)) = entry {
                            consider(
                                delta * c,
                                Feature::Edge {
                                    obstacle: oi,
                                    edge: ei,
                                    normal,
                                },
                            );
                        }
                    }
                }
            }
        }
        best
    }
}

#[inline]
fn unit(theta: f64) -> Point2 {
    Point2::new(theta.cos(), theta.sin())
}

/// Angle from `from` to `to` turning in the `sigma` sense, in [0, 2π); a
/// target a hair behind counts as reached.
#[inline]
fn ahead(from: f64, to: f64, sigma: f64) -> f64 {
    let sweep = (sigma * (to - from)).rem_euclid(TAU);
    if sweep > TAU - ANGLE_EPS {
        0.0
    } else {
        sweep
    }
}

/// Arc length at which the unit-speed ray `p0 + s·d` enters the disk of
/// radius `c` around `q`. Tangential touches and starts well inside do not
/// count.
fn line_disk_entry(p0: Point2, d: Point2, q: Point2, c: f64) -> Option<f64> {
    let w = p0 - q;
    let half_b = w.dot(&d);
    if half_b >= 0.0 {
        return None;
    }
    let k = w.norm_squared() - c * c;
    if k < -2.0 * c * EVENT_EPS {
        return None;
    }
    let disc = half_b * half_b - k;
    if disc <= TOUCH_EPS * c * c {
        return None;
    }
    let s = -half_b - disc.sqrt();
    (s > -EVENT_EPS).then(|| s.max(0.0))
}

/// Arc length at which the ray enters the rectangular part of the band of
/// half-width `c` around segment `a→b`, with the free-side normal of the face
/// crossed.
fn line_band_entry(p0: Point2, d: Point2, a: Point2, b: Point2, c: f64) -> Option<(f64, Point2)> {
    let len = (b - a).norm();
    let t = (b - a) / len;
    let m = left_perp(t);
    let h0 = (p0 - a).dot(&m);
    let dh = d.dot(&m);
    if dh.abs() < SLOPE_EPS {
        return None;
    }
    let mut best: Option<(f64, Point2)> = None;
    for side in [1.0, -1.0] {
        // only faces approached from outside
        if side * dh >= 0.0 {
            continue;
        }
        let s = (side * c - h0) / dh;
        if s <= -EVENT_EPS {
            continue;
        }
        let s = s.max(0.0);
        let along = (p0 + d * s - a).dot(&t);
        if !(0.0..=len).contains(&along) {
            continue;
        }
        if best.map_or(true, |(bs, _)| s < bs) {
            best = Some((s, m * side));
        }
    }
    best
}

/// Angle swept along the arc of radius `c` around `v`, starting at `theta0`
/// in the `sigma` sense, before entering the disk of radius `c` around `q`.
fn arc_disk_entry(v: Point2, theta0: f64, sigma: f64, c: f64, q: Point2) -> Option<f64> {
    let w = q - v;
    let dist = w.norm();
    if dist >= 2.0 * c || dist <= 0.0 {
        return None;
    }
    if (v + unit(theta0) * c - q).norm() < c - EVENT_EPS {
        return None;
    }
    let psi = w.y.atan2(w.x);
    let half = (dist / (2.0 * c)).acos();
    [psi + half, psi - half]
        .into_iter()
        .filter(|&theta| {
            let p = v + unit(theta) * c;
            let tangent = left_perp(unit(theta)) * sigma;
            (p - q).dot(&tangent) < 0.0
        })
        .map(|theta| ahead(theta0, theta, sigma))
        .min_by(|a, b| a.total_cmp(b))
}

/// Angle swept along the arc before entering the rectangular band around
/// `a→b`, with the free-side normal of the face crossed.
fn arc_band_entry(
    v: Point2,
    theta0: f64,
    sigma: f64,
    c: f64,
    a: Point2,
    b: Point2,
) -> Option<(f64, Point2)> {
    let len = (b - a).norm();
    let t = (b - a) / len;
    let m = left_perp(t);
    let hv = (v - a).dot(&m);
    let psi = m.y.atan2(m.x);
    let mut best: Option<(f64, Point2)> = None;
    for side in [1.0, -1.0] {
        let r = (side * c - hv) / c;
        if r.abs() > 1.0 {
            continue;
        }
        let half = r.acos();
        for theta in [psi + half, psi - half] {
            let dh = sigma * c * left_perp(unit(theta)).dot(&m);
            if side * dh >= 0.0 {
                continue;
            }
            let along = (v + unit(theta) * c - a).dot(&t);
            if !(0.0..=len).contains(&along) {
                continue;
            }
            let delta = ahead(theta0, theta, sigma);
            if best.map_or(true, |(bd, _)| delta < bd) {
                best = Some((delta, m * side));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn set(polys: Vec<Vec<[f64; 2]>>, clearance: f64) -> ObstacleSet {
        ObstacleSet::from_vertices(
            polys
                .into_iter()
                .map(|p| p.into_iter().map(|q| vector![q[0], q[1]]).collect()),
            clearance,
        )
        .unwrap()
    }

    fn square() -> ObstacleSet {
        set(vec![vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]], 0.1)
    }

    /// Walk `total` arc length in `step` increments, checking the offset
    /// invariant at every sample; returns the arc at which the walk revisited
    /// its origin, if it did.
    fn walk_checked(
        cursor: &mut BoundaryCursor,
        obs: &ObstacleSet,
        step: f64,
        total: f64,
    ) -> Option<f64> {
        let c = obs.clearance();
        let mut walked = 0.0;
        let mut closed = None;
        while walked < total {
            let p = cursor.advance(obs, step);
            walked += step;
            let gap = obs.clearance_at(p);
            assert!(gap >= c - 1e-9, "penetrated at {p:?}: {gap}");
            assert!(gap <= c + 1e-9, "drifted off the boundary at {p:?}: {gap}");
            if closed.is_none() && walked > 3.0 * step && cursor.revisits_origin(step) {
                closed = Some(walked);
            }
        }
        closed
    }

    #[test]
    fn hand_and_traversal_agree_with_winding() {
        let ccw = Polygon::from_xy(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap();
        let cw = Polygon::from_xy(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]]).unwrap();
        assert_eq!(Hand::for_traversal(&ccw, Traversal::Forward), Hand::Left);
        assert_eq!(Hand::for_traversal(&cw, Traversal::Forward), Hand::Right);
        assert_eq!(Hand::Right.traversal_on(&ccw), Traversal::Backward);
        assert_eq!(Hand::Right.traversal_on(&cw), Traversal::Forward);
        assert_eq!(Traversal::Backward.sign(), -1);
    }

    #[test]
    fn initialize_offsets_contact_onto_the_robot_side() {
        let obs = square();
        let hand = Hand::for_traversal(obs.polygon(0), Traversal::Forward);
        let cur = BoundaryCursor::initialize(&obs, 0, vector![-0.15, 1.0], hand);
        assert!((cur.position() - vector![-0.1, 1.0]).norm() < 1e-12);
        assert_eq!(cur.traversal(), Traversal::Forward);
        match cur.location() {
            Location::Edge { edge, progress, .. } => {
                assert_eq!(edge, 3);
                assert!((progress - 1.0).abs() < 1e-12);
            }
            other => panic!("expected an edge location, got {other:?}"),
        }
        // walking forward on edge 3 means heading down
        assert!((cur.heading() - vector![0.0, -1.0]).norm() < 1e-12);
    }

    #[test]
    fn thin_obstacle_keeps_the_contact_side() {
        let obs = set(vec![vec![[0.0, 0.0], [4.0, 0.0], [4.0, 0.02], [0.0, 0.02]]], 0.1);
        let above = BoundaryCursor::initialize(&obs, 0, vector![2.0, 0.5], Hand::Left);
        assert!((above.position() - vector![2.0, 0.12]).norm() < 1e-12);
        let below = BoundaryCursor::initialize(&obs, 0, vector![2.0, -0.5], Hand::Left);
        assert!((below.position() - vector![2.0, -0.1]).norm() < 1e-12);
    }

    #[test]
    fn advance_wraps_around_a_convex_corner() {
        let obs = square();
        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![-0.15, 1.0], Hand::Left);
        // to the end of edge 3
        let p = cur.advance(&obs, 1.0);
        assert!((p - vector![-0.1, 0.0]).norm() < 1e-12);
        // a quarter arc around (0,0)
        let p = cur.advance(&obs, 0.05 * PI);
        assert!((p - vector![0.0, -0.1]).norm() < 1e-9);
        // and onto edge 0
        let p = cur.advance(&obs, 0.5);
        assert!((p - vector![0.5, -0.1]).norm() < 1e-9);
        assert!(matches!(cur.location(), Location::Edge { edge: 0, .. }));
    }

    #[test]
    fn full_circuit_of_a_square_returns_to_origin() {
        let obs = square();
        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![-0.15, 1.0], Hand::Left);
        let circuit = 8.0 + TAU * 0.1;
        let closed = walk_checked(&mut cur, &obs, 0.05, circuit + 0.5).unwrap();
        assert!((closed - circuit).abs() < 0.1, "closed after {closed}");
    }

    #[test]
    fn right_hand_walks_clockwise() {
        let obs = square();
        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![-0.15, 1.0], Hand::Right);
        assert_eq!(cur.traversal(), Traversal::Backward);
        let p = cur.advance(&obs, 0.5);
        assert!((p - vector![-0.1, 1.5]).norm() < 1e-12);
    }

    #[test]
    fn concave_corner_is_cut_at_clearance() {
        // L-shape, reflex vertex at (1,1)
        let obs = set(
            vec![vec![
                [0.0, 0.0],
                [2.0, 0.0],
                [2.0, 1.0],
                [1.0, 1.0],
                [1.0, 2.0],
                [0.0, 2.0],
            ]],
            0.1,
        );
        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![1.5, 1.3], Hand::Left);
        // along y = 1.1 toward -x, then up x = 1.1 from the offset crossing
        let p = cur.advance(&obs, 0.4);
        assert!((p - vector![1.1, 1.1]).norm() < 1e-9);
        let p = cur.advance(&obs, 0.3);
        assert!((p - vector![1.1, 1.4]).norm() < 1e-9);
        assert!(matches!(cur.location(), Location::Edge { edge: 3, .. }));

        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![1.5, 1.3], Hand::Left);
        assert!(walk_checked(&mut cur, &obs, 0.05, 9.0).is_some());
    }

    #[test]
    fn narrow_channel_is_bypassed() {
        // ring with a slot of width 0.1 < 2·clearance
        let obs = set(
            vec![vec![
                [3.0, 0.05],
                [3.0, 3.0],
                [-3.0, 3.0],
                [-3.0, -3.0],
                [3.0, -3.0],
                [3.0, -0.05],
                [2.0, -0.05],
                [2.0, -2.0],
                [-2.0, -2.0],
                [-2.0, 2.0],
                [2.0, 2.0],
                [2.0, 0.05],
            ]],
            0.1,
        );
        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![3.1, 0.0], Hand::Left);
        assert!(matches!(cur.location(), Location::Corner { vertex: 0, .. }));
        let closed = walk_checked(&mut cur, &obs, 0.05, 30.0).unwrap();
        // outer square only: 24 plus the four corner arcs
        assert!(closed < 25.0, "closed after {closed}");
    }

    #[test]
    fn overlapping_inflations_are_walked_as_one() {
        // gap of 0.15 between the boxes, clearance 0.1
        let obs = set(
            vec![
                vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                vec![[1.15, 0.0], [2.15, 0.0], [2.15, 1.0], [1.15, 1.0]],
            ],
            0.1,
        );
        let mut cur = BoundaryCursor::initialize(&obs, 0, vector![-0.2, 0.5], Hand::Left);
        let mut visited_second = false;
        let mut walked = 0.0;
        while walked < 8.0 {
            let p = cur.advance(&obs, 0.05);
            walked += 0.05;
            assert!(obs.clearance_at(p) >= 0.1 - 1e-9);
            visited_second |= p.x > 2.2;
        }
        assert!(visited_second);
    }
}
