use tracing::debug;

use crate::config::PolicyKind;
use crate::cursor::{Hand, Traversal};
use crate::nav::types::{Decision, Env, Episode};
use crate::Point2;

use super::LeavePolicy;

/// Circle the obstacle once, then walk back to the closest-to-goal point.
#[derive(Clone, Debug, Default)]
pub struct ExhaustiveLoop {
    returning: bool,
}

impl ExhaustiveLoop {
    /// True once the first lap is complete.
    pub fn is_returning(&self) -> bool {
        self.returning
    }
}

impl LeavePolicy for ExhaustiveLoop {
    fn kind(&self) -> PolicyKind {
        PolicyKind::A
    }

    fn choose_hand(&mut self, env: &Env<'_>, _robot: Point2, obstacle: usize) -> Hand {
        Hand::for_traversal(env.obstacles.polygon(obstacle), Traversal::Forward)
    }

    fn on_enter_following(&mut self, _env: &Env<'_>, _episode: &mut Episode) {
        self.returning = false;
    }

    fn on_following_step(
        &mut self,
        env: &Env<'_>,
        episode: &mut Episode,
        _prev: Point2,
    ) -> Decision {
        let pos = episode.position();
        if self.returning {
            if (pos - episode.leave_candidate).norm() < env.step {
                return Decision::Leave {
                    at: episode.leave_candidate,
                };
            }
            return Decision::Continue;
        }
        let d = env.distance_to_goal(pos);
        if d < episode.best_heuristic {
            episode.best_heuristic = d;
            episode.leave_candidate = pos;
        }
        Decision::Continue
    }

    fn on_loop_closed(&mut self, env: &Env<'_>, episode: &mut Episode) -> Decision {
        if self.returning {
            // second lap without meeting the candidate: leave from it directly
            return Decision::Leave {
                at: episode.leave_candidate,
            };
        }
        self.returning = true;
        debug!(
            candidate_x = episode.leave_candidate.x,
            candidate_y = episode.leave_candidate.y,
            best = episode.best_heuristic,
            "lap complete, returning to closest point"
        );
        if (episode.position() - episode.leave_candidate).norm() < env.step {
            return Decision::Leave {
                at: episode.leave_candidate,
            };
        }
        Decision::Continue
    }

    fn min_lap_arc(&self, env: &Env<'_>, episode: &Episode) -> f64 {
        env.obstacles.polygon(episode.obstacle).perimeter()
    }
}
