//! Reproducible random obstacle fields.
//!
//! Model
//! - Each obstacle is a convex polygon: `n` jittered angles around a centre,
//!   jittered radii, convex hull of the resulting points.
//! - Centres are drawn uniformly in the field box; a candidate is rejected
//!   when its inflated disc overlaps an earlier obstacle or covers the start
//!   or goal. Placement gives up after a bounded number of attempts, so a
//!   crowded config yields fewer obstacles rather than looping.
//! - A `(seed, index)` replay token seeds one `StdRng`, so any field can be
//!   regenerated from its token alone.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NavConfig;
use crate::error::NavError;
use crate::geom::cross;
use crate::Point2;

use super::Scenario;

/// Vertex count distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VertexCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}

impl VertexCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            VertexCount::Fixed(n) => n.max(3),
            VertexCount::Uniform { min, max } => {
                let lo = min.max(3);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldCfg {
    pub obstacle_count: usize,
    pub vertex_count: VertexCount,
    /// Angular jitter as a fraction of the base spacing; clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Radii are `radius * (1 + u)` with `u` in `[-radial_jitter, radial_jitter]`.
    pub radial_jitter: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    /// Half-width of the square field centred on the origin.
    pub half_extent: f64,
    pub clearance: f64,
    pub start: [f64; 2],
    pub goal: [f64; 2],
    /// Placement attempts per obstacle.
    pub attempts: usize,
}

impl Default for FieldCfg {
    fn default() -> Self {
        Self {
            obstacle_count: 6,
            vertex_count: VertexCount::Uniform { min: 3, max: 8 },
            angle_jitter_frac: 0.3,
            radial_jitter: 0.25,
            radius_min: 0.5,
            radius_max: 1.5,
            half_extent: 6.0,
            clearance: 0.1,
            start: [-8.0, 0.0],
            goal: [8.0, 0.0],
            attempts: 64,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    fn to_std_rng(self) -> StdRng {
        // splitmix64 finalizer
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// Convex polygon around `center`, counter-clockwise.
fn draw_convex<R: Rng>(rng: &mut R, cfg: &FieldCfg, center: Point2, radius: f64) -> Vec<Point2> {
    let n = cfg.vertex_count.sample(rng);
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.clamp(0.0, 0.9);
    let delta = TAU / n as f64;
    let phase = rng.gen::<f64>() * TAU;
    let pts: Vec<Point2> = (0..n)
        .map(|k| {
            let th = phase + k as f64 * delta + (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            let r = radius * (1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * rj);
            center + Point2::new(th.cos(), th.sin()) * r
        })
        .collect();
    convex_hull(pts)
}

/// Andrew's monotone chain; collinear points dropped.
fn convex_hull(mut pts: Vec<Point2>) -> Vec<Point2> {
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let mut hull: Vec<Point2> = Vec::with_capacity(2 * pts.len());
    for pass in 0..2 {
        let base = hull.len();
        let iter: Box<dyn Iterator<Item = &Point2>> = if pass == 0 {
            Box::new(pts.iter())
        } else {
            Box::new(pts.iter().rev())
        };
        for &p in iter {
            while hull.len() >= base + 2 {
                let a = hull[hull.len() - 2];
                let b = hull[hull.len() - 1];
                if cross(b - a, p - b) > 1e-12 {
                    break;
                }
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Draw a field of convex obstacles between `cfg.start` and `cfg.goal`.
///
/// The returned scenario carries `nav` as its config and always validates.
pub fn draw_field(cfg: &FieldCfg, nav: &NavConfig, tok: ReplayToken) -> Result<Scenario, NavError> {
    nav.validate()?;
    if !(cfg.radius_min > 0.0 && cfg.radius_max >= cfg.radius_min && cfg.half_extent > 0.0) {
        return Err(NavError::invalid_config(
            "field radii must satisfy 0 < radius_min <= radius_max and half_extent > 0",
        ));
    }
    let mut rng = tok.to_std_rng();
    let start = Point2::new(cfg.start[0], cfg.start[1]);
    let goal = Point2::new(cfg.goal[0], cfg.goal[1]);
    let rj = cfg.radial_jitter.clamp(0.0, 0.9);
    // (centre, outer radius incl. clearance)
    let mut placed: Vec<(Point2, f64)> = Vec::new();
    let mut obstacles = Vec::with_capacity(cfg.obstacle_count);
    for _ in 0..cfg.obstacle_count {
        for _ in 0..cfg.attempts.max(1) {
            let radius = rng.gen_range(cfg.radius_min..=cfg.radius_max);
            let outer = radius * (1.0 + rj) + cfg.clearance;
            let center = Point2::new(
                rng.gen_range(-cfg.half_extent..=cfg.half_extent),
                rng.gen_range(-cfg.half_extent..=cfg.half_extent),
            );
            let clear_of_ends = (center - start).norm() > outer + cfg.clearance
                && (center - goal).norm() > outer + cfg.clearance;
            let clear_of_others = placed
                .iter()
                .all(|&(c, r)| (center - c).norm() > r + outer);
            if clear_of_ends && clear_of_others {
                let poly = draw_convex(&mut rng, cfg, center, radius);
                if poly.len() >= 3 {
                    placed.push((center, outer));
                    obstacles.push(poly.iter().map(|p| [p.x, p.y]).collect());
                    break;
                }
            }
        }
    }
    debug!(
        seed = tok.seed,
        index = tok.index,
        requested = cfg.obstacle_count,
        placed = obstacles.len(),
        "random field"
    );
    let scenario = Scenario {
        obstacles,
        clearance: cfg.clearance,
        start: cfg.start,
        goal: cfg.goal,
        config: nav.clone(),
    };
    scenario.obstacle_set()?;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Polygon;

    #[test]
    fn same_token_same_field() {
        let cfg = FieldCfg::default();
        let nav = NavConfig::default();
        let a = draw_field(&cfg, &nav, ReplayToken::new(7, 3)).unwrap();
        let b = draw_field(&cfg, &nav, ReplayToken::new(7, 3)).unwrap();
        let c = draw_field(&cfg, &nav, ReplayToken::new(7, 4)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.obstacles, c.obstacles);
    }

    #[test]
    fn polygons_are_convex_ccw() {
        let cfg = FieldCfg::default();
        for index in 0..10 {
            let s = draw_field(&cfg, &NavConfig::default(), ReplayToken::new(1, index)).unwrap();
            for raw in &s.obstacles {
                let poly = Polygon::from_xy(raw).unwrap();
                assert!(poly.is_ccw());
                for i in 0..poly.len() {
                    let (a, b) = poly.edge(i);
                    let (_, c) = poly.edge(i + 1);
                    assert!(cross(b - a, c - b) > 0.0);
                }
            }
        }
    }

    #[test]
    fn start_and_goal_stay_free() {
        let cfg = FieldCfg {
            obstacle_count: 20,
            ..FieldCfg::default()
        };
        for index in 0..10 {
            let s = draw_field(&cfg, &NavConfig::default(), ReplayToken::new(42, index)).unwrap();
            assert!(s.obstacles.len() <= 20);
            s.session().unwrap();
        }
    }

    #[test]
    fn hull_drops_interior_points() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.2),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let hull = convex_hull(pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point2::new(0.5, 0.2)));
    }

    #[test]
    fn bad_radii_rejected() {
        let cfg = FieldCfg {
            radius_min: 2.0,
            radius_max: 1.0,
            ..FieldCfg::default()
        };
        assert!(draw_field(&cfg, &NavConfig::default(), ReplayToken::new(0, 0)).is_err());
    }
}
