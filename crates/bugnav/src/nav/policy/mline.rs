use tracing::trace;

use crate::config::PolicyKind;
use crate::cursor::{Hand, Traversal};
use crate::geom::{closest_point_on_segment, segments_intersect};
use crate::nav::types::{Decision, Env, Episode, FailureReason};
use crate::Point2;

use super::LeavePolicy;

/// Leave where the start–goal segment (M-line) is met again, closer to the
/// goal than the hit point.
#[derive(Clone, Copy, Debug, Default)]
pub struct MLineReencounter;

impl MLineReencounter {
    /// Point where the move `prev→pos` meets the M-line, or the projection of
    /// `pos` when it lies within `tolerance` of the segment.
    ///
    /// The chord between two samples cuts inside the clearance band around a
    /// corner. A contact that falls inside the band is moved to where the
    /// M-line crosses the offset boundary itself.
    pub fn mline_contact(env: &Env<'_>, prev: Point2, pos: Point2) -> Option<Point2> {
        let raw = Self::raw_contact(env, prev, pos)?;
        if env.obstacles.clearance_at(raw) >= env.obstacles.clearance() {
            return Some(raw);
        }
        env.obstacles.offset_crossing(raw, env.start, env.goal)
    }

    fn raw_contact(env: &Env<'_>, prev: Point2, pos: Point2) -> Option<Point2> {
        if let Some(x) = segments_intersect(prev, pos, env.start, env.goal) {
            return Some(x);
        }
        let line = env.goal - env.start;
        let len2 = line.norm_squared();
        if len2 <= 0.0 {
            return None;
        }
        let t = (pos - env.start).dot(&line) / len2;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let (q, d) = closest_point_on_segment(pos, env.start, env.goal);
        (d < env.tolerance).then_some(q)
    }
}

impl LeavePolicy for MLineReencounter {
    fn kind(&self) -> PolicyKind {
        PolicyKind::B
    }

    fn choose_hand(&mut self, env: &Env<'_>, _robot: Point2, obstacle: usize) -> Hand {
        Hand::for_traversal(env.obstacles.polygon(obstacle), Traversal::Forward)
    }

    fn on_following_step(
        &mut self,
        env: &Env<'_>,
        episode: &mut Episode,
        prev: Point2,
    ) -> Decision {
        let pos = episode.position();
        let Some(snap) = Self::mline_contact(env, prev, pos) else {
            return Decision::Continue;
        };
        // the free-step test keeps the blocked entry point from counting
        let needed = env.distance_to_goal(episode.hit_point);
        let got = env.distance_to_goal(snap);
        if got < needed && env.step_is_free(snap) {
            episode.leave_candidate = snap;
            episode.best_heuristic = got;
            return Decision::Leave { at: snap };
        }
        trace!(got, needed, "m-line met without progress");
        Decision::Continue
    }

    fn on_loop_closed(&mut self, _env: &Env<'_>, _episode: &mut Episode) -> Decision {
        Decision::Fail(FailureReason::GoalUnreachable)
    }
}
