//! Simulated 360° range sensor.
//!
//! One beam per `angular_resolution` over a full turn, starting at angle 0
//! (+x) and increasing counter-clockwise. Each beam reports the distance to
//! the first polygon edge it crosses, capped at `max_range`. Clearance plays
//! no role here: the sensor sees raw polygon boundaries.

use std::f64::consts::TAU;

use crate::config::SensorCfg;
use crate::geom::segments_intersect;
use crate::obstacles::ObstacleSet;
use crate::Point2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beam {
    pub angle: f64,
    pub range: f64,
    /// Obstacle hit by this beam, `None` when nothing is within range.
    pub obstacle: Option<usize>,
}

impl Beam {
    #[inline]
    pub fn direction(&self) -> Point2 {
        Point2::new(self.angle.cos(), self.angle.sin())
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.obstacle.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct RangeScan {
    origin: Point2,
    max_range: f64,
    spacing: f64,
    beams: Vec<Beam>,
}

impl RangeScan {
    #[inline]
    pub fn origin(&self) -> Point2 {
        self.origin
    }

    #[inline]
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    #[inline]
    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Shortest beam that hit something.
    pub fn nearest(&self) -> Option<&Beam> {
        self.beams
            .iter()
            .filter(|b| b.is_hit())
            .min_by(|a, b| a.range.total_cmp(&b.range))
    }

    /// Beam whose angle is closest to the heading of `dir`.
    pub fn beam_toward(&self, dir: Point2) -> &Beam {
        let angle = dir.y.atan2(dir.x).rem_euclid(TAU);
        let idx = (angle / self.spacing).round() as usize % self.beams.len();
        &self.beams[idx]
    }

    /// Range reported toward `dir`.
    pub fn range_toward(&self, dir: Point2) -> f64 {
        self.beam_toward(dir).range
    }

    /// Obstacle seen toward `dir` closer than `within`, if any.
    pub fn obstructed_toward(&self, dir: Point2, within: f64) -> Option<usize> {
        let beam = self.beam_toward(dir);
        beam.obstacle.filter(|_| beam.range < within)
    }

    /// World point where a beam ends.
    pub fn endpoint(&self, beam: &Beam) -> Point2 {
        self.origin + beam.direction() * beam.range
    }
}

/// Distance along the unit ray `origin + s·dir` to the first edge crossing.
pub fn cast_ray(
    origin: Point2,
    dir: Point2,
    obstacles: &ObstacleSet,
    max_range: f64,
) -> (f64, Option<usize>) {
    let end = origin + dir * max_range;
    let mut best = (max_range, None);
    for (i, poly) in obstacles.polygons().iter().enumerate() {
        for (a, b) in poly.edges() {
            if let Some(x) = segments_intersect(origin, end, a, b) {
                let d = (x - origin).norm();
                if d < best.0 {
                    best = (d, Some(i));
                }
            }
        }
    }
    best
}

pub fn scan(position: Point2, obstacles: &ObstacleSet, cfg: &SensorCfg) -> RangeScan {
    let count = cfg.beam_count();
    let spacing = TAU / count as f64;
    let beams = (0..count)
        .map(|k| {
            let angle = k as f64 * spacing;
            let dir = Point2::new(angle.cos(), angle.sin());
            let (range, obstacle) = cast_ray(position, dir, obstacles, cfg.max_range);
            Beam {
                angle,
                range,
                obstacle,
            }
        })
        .collect();
    RangeScan {
        origin: position,
        max_range: cfg.max_range,
        spacing,
        beams,
    }
}
