use tracing::trace;

use crate::config::PolicyKind;
use crate::cursor::Hand;
use crate::geom::cross;
use crate::nav::types::{Decision, Env, Episode, FailureReason};
use crate::sensor;
use crate::Point2;

use super::LeavePolicy;

/// Range-sensor policy: turn toward the side the goal is on, leave as soon
/// as the goal is in sight.
#[derive(Clone, Copy, Debug, Default)]
pub struct TangentHeuristic;

impl LeavePolicy for TangentHeuristic {
    fn kind(&self) -> PolicyKind {
        PolicyKind::C
    }

    fn blocking_obstacle(&mut self, env: &Env<'_>, from: Point2, to: Point2) -> Option<usize> {
        let step = to - from;
        let stride = step.norm();
        if stride > 0.0 {
            let scan = sensor::scan(from, env.obstacles, &env.sensor);
            let within = env.obstacles.clearance() + stride;
            if let Some(obstacle) = scan.obstructed_toward(step, within) {
                return Some(obstacle);
            }
        }
        env.obstacles.first_blocking(from, to)
    }

    /// Counter-clockwise when the goal lies left of the nearest sensed point.
    fn choose_hand(&mut self, env: &Env<'_>, robot: Point2, obstacle: usize) -> Hand {
        let scan = sensor::scan(robot, env.obstacles, &env.sensor);
        let to_obstacle = match scan.nearest() {
            Some(beam) => beam.direction(),
            None => env.obstacles.polygon(obstacle).closest_point(robot).point - robot,
        };
        let to_goal = env.goal - robot;
        let ccw = cross(to_obstacle, to_goal) > 0.0;
        trace!(ccw, "following sense from range scan");
        Hand::for_rotation(ccw)
    }

    fn on_following_step(
        &mut self,
        env: &Env<'_>,
        episode: &mut Episode,
        _prev: Point2,
    ) -> Decision {
        let pos = episode.position();
        if !env.obstacles.line_of_sight(pos, env.goal) {
            return Decision::Continue;
        }
        let heuristic = episode.traversed + env.distance_to_goal(pos);
        if heuristic < episode.best_heuristic {
            episode.best_heuristic = heuristic;
            episode.leave_candidate = pos;
        }
        Decision::Leave { at: pos }
    }

    fn on_loop_closed(&mut self, env: &Env<'_>, episode: &mut Episode) -> Decision {
        let candidate = episode.leave_candidate;
        if candidate != episode.hit_point && env.obstacles.line_of_sight(candidate, env.goal) {
            return Decision::Leave { at: candidate };
        }
        Decision::Fail(FailureReason::GoalUnreachable)
    }
}
