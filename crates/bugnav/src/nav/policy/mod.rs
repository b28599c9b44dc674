//! Leave policies.
//!
//! The session calls, per episode: `choose_hand` once at the hit, then
//! `on_enter_following`, then `on_following_step` after every cursor advance,
//! and `on_loop_closed` whenever the cursor completes a lap. While seeking,
//! `blocking_obstacle` decides whether the next step triggers following.

use std::fmt;

use crate::config::PolicyKind;
use crate::cursor::Hand;
use crate::Point2;

use super::types::{Decision, Env, Episode};

mod exhaustive;
mod mline;
mod tangent;

pub use exhaustive::ExhaustiveLoop;
pub use mline::MLineReencounter;
pub use tangent::TangentHeuristic;

pub trait LeavePolicy: fmt::Debug + Send {
    fn kind(&self) -> PolicyKind;

    /// Obstacle blocking the seeking move `from→to`, if any.
    fn blocking_obstacle(&mut self, env: &Env<'_>, from: Point2, to: Point2) -> Option<usize> {
        env.obstacles.first_blocking(from, to)
    }

    /// Following sense for a new episode against `obstacle`.
    fn choose_hand(&mut self, env: &Env<'_>, robot: Point2, obstacle: usize) -> Hand;

    /// Reset per-episode policy state.
    fn on_enter_following(&mut self, _env: &Env<'_>, _episode: &mut Episode) {}

    /// Called after every following step; `prev` is the position before it.
    fn on_following_step(&mut self, env: &Env<'_>, episode: &mut Episode, prev: Point2) -> Decision;

    fn on_loop_closed(&mut self, env: &Env<'_>, episode: &mut Episode) -> Decision;

    /// Arc that must be walked before a return to the cursor origin counts as a lap.
    fn min_lap_arc(&self, env: &Env<'_>, _episode: &Episode) -> f64 {
        env.step
    }
}

pub fn make_policy(kind: PolicyKind) -> Box<dyn LeavePolicy> {
    match kind {
        PolicyKind::A => Box::new(ExhaustiveLoop::default()),
        PolicyKind::B => Box::new(MLineReencounter),
        PolicyKind::C => Box::new(TangentHeuristic),
    }
}
