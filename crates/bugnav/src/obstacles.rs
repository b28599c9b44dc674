//! Obstacle model: validated polygons plus the robot clearance radius.
//!
//! The set is immutable once built and is shared read-only by the kernel
//! queries, the sensor and the boundary cursor (wrap it in `Arc` to share it
//! between sessions).

use crate::error::NavError;
use crate::geom::cfg::{DET_EPS, PARAM_EPS};
use crate::geom::{
    closest_point_on_polygon, left_perp, line_of_sight, segment_blocked, swept_origin,
    BoundaryPoint, Polygon,
};
use crate::Point2;

/// A crossing this far inside the clearance band still counts as on it.
const CROSSING_EPS: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleSet {
    polygons: Vec<Polygon>,
    clearance: f64,
}

impl ObstacleSet {
    pub fn new(polygons: Vec<Polygon>, clearance: f64) -> Result<Self, NavError> {
        if !clearance.is_finite() || clearance < 0.0 {
            return Err(NavError::invalid_config(format!(
                "clearance must be finite and >= 0, got {clearance}"
            )));
        }
        Ok(Self {
            polygons,
            clearance,
        })
    }

    /// Validate raw vertex lists; the failing polygon's index is reported.
    pub fn from_vertices<I>(lists: I, clearance: f64) -> Result<Self, NavError>
    where
        I: IntoIterator<Item = Vec<Point2>>,
    {
        let polygons = lists
            .into_iter()
            .enumerate()
            .map(|(obstacle, vertices)| {
                Polygon::new(vertices)
                    .map_err(|source| NavError::InvalidGeometry { obstacle, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(polygons, clearance)
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Panics on an out-of-range index; indices come from this set's own queries.
    #[inline]
    pub fn polygon(&self, i: usize) -> &Polygon {
        &self.polygons[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    /// Total vertex count over all polygons.
    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(Polygon::len).sum()
    }

    /// Nearest boundary point over all polygons (ties to the lowest index).
    pub fn nearest(&self, p: Point2) -> Option<(usize, BoundaryPoint)> {
        let mut best: Option<(usize, BoundaryPoint)> = None;
        for (i, poly) in self.polygons.iter().enumerate() {
            let bp = closest_point_on_polygon(p, poly);
            if best.map_or(true, |(_, b)| bp.distance < b.distance) {
                best = Some((i, bp));
            }
        }
        best
    }

    /// Distance from `p` to the nearest polygon region (0 inside one).
    pub fn clearance_at(&self, p: Point2) -> f64 {
        self.polygons
            .iter()
            .map(|poly| {
                if poly.contains(p) {
                    0.0
                } else {
                    closest_point_on_polygon(p, poly).distance
                }
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// First polygon whose inflated region strictly contains `p`.
    pub fn colliding(&self, p: Point2) -> Option<usize> {
        self.polygons.iter().position(|poly| {
            poly.contains(p) || closest_point_on_polygon(p, poly).distance < self.clearance
        })
    }

    pub fn line_of_sight(&self, a: Point2, b: Point2) -> bool {
        line_of_sight(a, b, &self.polygons, self.clearance)
    }

    /// Obstacle that blocks the swept move `a→b`, nearest to `a` first.
    pub fn first_blocking(&self, a: Point2, b: Point2) -> Option<usize> {
        let from = swept_origin(a, b);
        let mut best: Option<(usize, f64)> = None;
        for (i, poly) in self.polygons.iter().enumerate() {
            if !segment_blocked(from, b, poly, self.clearance) {
                continue;
            }
            let d = closest_point_on_polygon(a, poly).distance;
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Where the segment `a→b` meets the clearance offset of the boundary
    /// feature nearest `near`: the offset line of an edge, or the circle of
    /// radius `clearance` around a vertex. Of two crossings the one closer to
    /// `near` is taken.
    ///
    /// `None` when the segment misses that offset, or when the crossing lies
    /// within the inflation of another feature (e.g. at a concave corner).
    pub fn offset_crossing(&self, near: Point2, a: Point2, b: Point2) -> Option<Point2> {
        let (obstacle, bp) = self.nearest(near)?;
        let c = self.clearance;
        let len = (b - a).norm();
        if len <= 0.0 {
            return None;
        }
        let u = (b - a) / len;
        let (e0, e1) = self.polygon(obstacle).edge(bp.edge);

        let mut roots = [f64::NAN; 2];
        let mut corner = match bp.param {
            t if t <= PARAM_EPS => Some(e0),
            t if t >= 1.0 - PARAM_EPS => Some(e1),
            _ => None,
        };
        if corner.is_none() {
            let edge_len = (e1 - e0).norm();
            let t = (e1 - e0) / edge_len;
            let mut m = left_perp(t);
            if (near - e0).dot(&m) < 0.0 {
                m = -m;
            }
            let du = u.dot(&m);
            if du.abs() > DET_EPS {
                let s = (c - (a - e0).dot(&m)) / du;
                let foot = (a + u * s - e0).dot(&t);
                if (0.0..=edge_len).contains(&foot) {
                    roots[0] = s;
                } else {
                    corner = Some(if foot < 0.0 { e0 } else { e1 });
                }
            }
        }
        if let Some(v) = corner {
            let w = a - v;
            let half_b = w.dot(&u);
            let disc = half_b * half_b - (w.norm_squared() - c * c);
            if disc >= 0.0 {
                roots = [-half_b - disc.sqrt(), -half_b + disc.sqrt()];
            }
        }

        let s_near = (near - a).dot(&u);
        let s = roots
            .into_iter()
            .filter(|s| (-PARAM_EPS..=len + PARAM_EPS).contains(s))
            .min_by(|x, y| (x - s_near).abs().total_cmp(&(y - s_near).abs()))?;
        let x = a + u * s.clamp(0.0, len);
        (self.clearance_at(x) >= c - CROSSING_EPS).then_some(x)
    }
}
