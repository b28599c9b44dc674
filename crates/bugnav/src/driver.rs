//! Step loop around a [`NavigationSession`].
//!
//! The session itself never loops; `drive` repeats `step()` up to a
//! caller-chosen cap and records the positions into a caller-owned [`Path`].
//! Hitting the cap aborts the session with `FailureReason::IterationLimit`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::nav::{Event, FailureReason, NavigationSession};
use crate::Point2;

/// Positions visited by the robot, consecutive duplicates collapsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    points: Vec<Point2>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(start: Point2) -> Self {
        Self {
            points: vec![start],
        }
    }

    /// Append `p` unless it repeats the last point.
    pub fn push(&mut self, p: Point2) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }

    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<Point2> {
        self.points.last().copied()
    }

    /// Polyline length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Succeeded([f64; 2]),
    Failed(FailureReason),
}

impl Outcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub steps: usize,
    pub episodes: usize,
    pub path_length: f64,
    pub final_position: [f64; 2],
}

/// Run `session` until it terminates or `max_steps` ticks were spent.
///
/// The start position is pushed first if `path` is empty.
pub fn drive(session: &mut NavigationSession, path: &mut Path, max_steps: usize) -> RunSummary {
    if path.is_empty() {
        path.push(session.position());
    }
    let mut outcome = None;
    for _ in 0..max_steps {
        match session.step() {
            Event::Continuing(p) => path.push(p),
            Event::Succeeded(p) => {
                path.push(p);
                outcome = Some(Outcome::Succeeded([p.x, p.y]));
                break;
            }
            Event::Failed(reason) => {
                outcome = Some(Outcome::Failed(reason));
                break;
            }
        }
    }
    let outcome = outcome.unwrap_or_else(|| {
        warn!(max_steps, "step cap reached");
        session.abort(FailureReason::IterationLimit);
        Outcome::Failed(FailureReason::IterationLimit)
    });
    let pos = session.position();
    let summary = RunSummary {
        outcome,
        steps: session.steps(),
        episodes: session.episodes(),
        path_length: path.length(),
        final_position: [pos.x, pos.y],
    };
    debug!(?summary, "run finished");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn push_collapses_repeats() {
        let mut p = Path::new();
        p.push(vector![0.0, 0.0]);
        p.push(vector![0.0, 0.0]);
        p.push(vector![3.0, 4.0]);
        p.push(vector![3.0, 4.0]);
        assert_eq!(p.len(), 2);
        assert_eq!(p.length(), 5.0);
        assert_eq!(p.last(), Some(vector![3.0, 4.0]));
        assert_eq!(p.xs(), vec![0.0, 3.0]);
    }

    #[test]
    fn empty_path_has_zero_length() {
        assert_eq!(Path::new().length(), 0.0);
        assert_eq!(Path::with_start(vector![1.0, 1.0]).length(), 0.0);
    }
}
