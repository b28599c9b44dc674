use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{NavConfig, SensorCfg};
use crate::cursor::BoundaryCursor;
use crate::obstacles::ObstacleSet;
use crate::Point2;

/// Walked arc, in steps, before a return to the cursor origin counts as a lap.
pub(crate) const MIN_LAP_STEPS: f64 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Seeking,
    Following,
    Succeeded,
    Failed,
}

impl Mode {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Mode::Succeeded | Mode::Failed)
    }
}

/// Why a run ended without reaching the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    GoalUnreachable,
    IterationLimit,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::GoalUnreachable => f.write_str("goal unreachable"),
            FailureReason::IterationLimit => f.write_str("iteration limit"),
        }
    }
}

/// Outcome of one `step()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Continuing(Point2),
    Succeeded(Point2),
    Failed(FailureReason),
}

impl Event {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Continuing(_))
    }
}

/// What a policy wants after a following step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    Continue,
    /// Stop following and resume seeking from `at`.
    Leave { at: Point2 },
    Fail(FailureReason),
}

/// Read-only view of the run handed to policies.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a> {
    pub obstacles: &'a ObstacleSet,
    pub start: Point2,
    pub goal: Point2,
    pub step: f64,
    pub tolerance: f64,
    pub sensor: SensorCfg,
}

impl<'a> Env<'a> {
    pub(crate) fn new(
        obstacles: &'a ObstacleSet,
        start: Point2,
        goal: Point2,
        cfg: &NavConfig,
    ) -> Self {
        Self {
            obstacles,
            start,
            goal,
            step: cfg.step_size,
            tolerance: cfg.tolerance,
            sensor: cfg.sensor,
        }
    }

    #[inline]
    pub fn distance_to_goal(&self, p: Point2) -> f64 {
        (self.goal - p).norm()
    }

    /// Next seeking position from `p`: one step toward the goal, never past it.
    pub fn seek_target(&self, p: Point2) -> Point2 {
        let to_goal = self.goal - p;
        let d = to_goal.norm();
        if d <= self.step {
            self.goal
        } else {
            p + to_goal * (self.step / d)
        }
    }

    /// Whether the first seeking step from `p` is unobstructed.
    pub fn step_is_free(&self, p: Point2) -> bool {
        self.obstacles.first_blocking(p, self.seek_target(p)).is_none()
    }
}

/// Bookkeeping for one boundary-following episode.
#[derive(Clone, Debug)]
pub struct Episode {
    /// Obstacle that blocked the robot.
    pub obstacle: usize,
    pub hit_point: Point2,
    pub leave_candidate: Point2,
    pub best_heuristic: f64,
    /// Arc length walked since the hit.
    pub traversed: f64,
    pub cursor: BoundaryCursor,
    /// `traversed` at the last lap closure.
    pub(crate) lap_mark: f64,
    pub laps: usize,
}

impl Episode {
    pub(crate) fn new(
        obstacle: usize,
        hit_point: Point2,
        goal: Point2,
        cursor: BoundaryCursor,
    ) -> Self {
        Self {
            obstacle,
            hit_point,
            leave_candidate: hit_point,
            best_heuristic: (goal - hit_point).norm(),
            traversed: 0.0,
            cursor,
            lap_mark: 0.0,
            laps: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> Point2 {
        self.cursor.position()
    }

    /// Registers a lap when the cursor is back at its origin after walking at
    /// least `min_arc` since the previous one.
    pub(crate) fn close_lap(&mut self, step: f64, min_arc: f64) -> bool {
        let walked = self.traversed - self.lap_mark;
        if walked < min_arc.max(MIN_LAP_STEPS * step) || !self.cursor.revisits_origin(step) {
            return false;
        }
        self.lap_mark = self.traversed;
        self.laps += 1;
        true
    }
}
