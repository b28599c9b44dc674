//! Bug navigator: one mode state machine, three leave policies.
//!
//! Purpose
//! - `NavigationSession` owns the robot state and advances it one tick per
//!   `step()`: straight at the goal while SEEKING, along the offset boundary
//!   while FOLLOWING.
//! - What differs between the bug variants (following direction, when to
//!   leave, when to give up) lives behind the `LeavePolicy` trait.
//!
//! Policies
//! - `ExhaustiveLoop` (A): circle the obstacle once, return to the point
//!   closest to the goal, leave from there.
//! - `MLineReencounter` (B): leave where the start–goal segment is met again
//!   closer to the goal than the hit point.
//! - `TangentHeuristic` (C): sensor-chosen direction, leave as soon as the
//!   goal is in sight.
//!
//! References
//! - Lumelsky & Stepanov, "Path-planning strategies for a point mobile
//!   automaton moving amidst unknown obstacles of arbitrary shape" (1987).
//! - Kamon, Rivlin & Rimon, "A new range-sensor based globally convergent
//!   navigation algorithm for mobile robots" (TangentBug, 1996).

pub mod policy;
mod session;
mod types;

pub use policy::{make_policy, ExhaustiveLoop, LeavePolicy, MLineReencounter, TangentHeuristic};
pub use session::NavigationSession;
pub use types::{Decision, Env, Episode, Event, FailureReason, Mode};
