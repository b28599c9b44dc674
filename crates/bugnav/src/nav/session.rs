use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::config::{NavConfig, PolicyKind};
use crate::cursor::{BoundaryCursor, Traversal};
use crate::error::{Endpoint, NavError};
use crate::obstacles::ObstacleSet;
use crate::Point2;

use super::policy::{make_policy, LeavePolicy};
use super::types::{Decision, Env, Episode, Event, FailureReason, Mode};

/// One navigation run from `start` to `goal`.
///
/// Mutated only through [`NavigationSession::step`] (and `abort`). Terminal
/// states are sticky: further steps return the same terminal event without
/// touching the state.
#[derive(Debug)]
pub struct NavigationSession {
    obstacles: Arc<ObstacleSet>,
    start: Point2,
    goal: Point2,
    cfg: NavConfig,
    policy: Box<dyn LeavePolicy>,
    mode: Mode,
    position: Point2,
    episode: Option<Episode>,
    hit_point: Option<Point2>,
    leave_candidate: Option<Point2>,
    following: Option<Traversal>,
    /// Obstacle left most recently, until a free seeking step is taken.
    just_left: Option<usize>,
    failure: Option<FailureReason>,
    steps: usize,
    episodes: usize,
}

impl NavigationSession {
    pub fn new(
        obstacles: Arc<ObstacleSet>,
        start: Point2,
        goal: Point2,
        cfg: NavConfig,
    ) -> Result<Self, NavError> {
        cfg.validate()?;
        for (which, p) in [(Endpoint::Start, start), (Endpoint::Goal, goal)] {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(NavError::invalid_config(format!("{which} is not finite")));
            }
            if let Some(obstacle) = obstacles.colliding(p) {
                return Err(NavError::StartOrGoalInCollision { which, obstacle });
            }
        }
        let policy = make_policy(cfg.policy);
        debug!(policy = %cfg.policy, obstacles = obstacles.len(), "session created");
        Ok(Self {
            obstacles,
            start,
            goal,
            cfg,
            policy,
            mode: Mode::Seeking,
            position: start,
            episode: None,
            hit_point: None,
            leave_candidate: None,
            following: None,
            just_left: None,
            failure: None,
            steps: 0,
            episodes: 0,
        })
    }

    /// Advance one tick.
    pub fn step(&mut self) -> Event {
        match self.mode {
            Mode::Succeeded => return Event::Succeeded(self.position),
            Mode::Failed => {
                return Event::Failed(self.failure.unwrap_or(FailureReason::GoalUnreachable))
            }
            Mode::Seeking | Mode::Following => {}
        }
        self.steps += 1;
        if (self.goal - self.position).norm() <= self.cfg.tolerance {
            self.position = self.goal;
            self.episode = None;
            self.set_mode(Mode::Succeeded);
            info!(steps = self.steps, episodes = self.episodes, "goal reached");
            return Event::Succeeded(self.position);
        }
        match self.mode {
            Mode::Seeking => self.seek(),
            _ => self.follow(),
        }
    }

    /// Stop the run with `reason` (used for caller-side iteration caps).
    pub fn abort(&mut self, reason: FailureReason) {
        if !self.mode.is_terminal() {
            self.fail(reason);
        }
    }

    fn seek(&mut self) -> Event {
        let env = Env::new(self.obstacles.as_ref(), self.start, self.goal, &self.cfg);
        let from = self.position;
        let target = env.seek_target(from);
        match self.policy.blocking_obstacle(&env, from, target) {
            None => {
                self.position = target;
                self.just_left = None;
                trace!(x = target.x, y = target.y, "seek");
                Event::Continuing(target)
            }
            Some(obstacle) if self.just_left == Some(obstacle) => {
                debug!(obstacle, "blocked again by the obstacle just left");
                self.fail(FailureReason::GoalUnreachable)
            }
            Some(obstacle) => {
                self.begin_following(obstacle);
                Event::Continuing(self.position)
            }
        }
    }

    fn begin_following(&mut self, obstacle: usize) {
        let env = Env::new(self.obstacles.as_ref(), self.start, self.goal, &self.cfg);
        let robot = self.position;
        let hand = self.policy.choose_hand(&env, robot, obstacle);
        let cursor = BoundaryCursor::initialize(env.obstacles, obstacle, robot, hand);
        let traversal = cursor.traversal();
        let mut episode = Episode::new(obstacle, robot, self.goal, cursor);
        self.policy.on_enter_following(&env, &mut episode);
        self.episode = Some(episode);
        self.hit_point = Some(robot);
        self.leave_candidate = Some(robot);
        self.following = Some(traversal);
        self.episodes += 1;
        debug!(
            obstacle,
            x = robot.x,
            y = robot.y,
            direction = traversal.sign(),
            "hit, following boundary"
        );
        self.set_mode(Mode::Following);
    }

    fn follow(&mut self) -> Event {
        let env = Env::new(self.obstacles.as_ref(), self.start, self.goal, &self.cfg);
        let Some(episode) = self.episode.as_mut() else {
            self.mode = Mode::Seeking;
            return Event::Continuing(self.position);
        };
        let prev = self.position;
        let pos = episode.cursor.advance(env.obstacles, env.step);
        episode.traversed += env.step;
        let mut decision = self.policy.on_following_step(&env, episode, prev);
        if decision == Decision::Continue {
            let min_arc = self.policy.min_lap_arc(&env, episode);
            if episode.close_lap(env.step, min_arc) {
                debug!(laps = episode.laps, traversed = episode.traversed, "loop closed");
                decision = self.policy.on_loop_closed(&env, episode);
            }
        }
        let obstacle = episode.obstacle;
        self.leave_candidate = Some(episode.leave_candidate);
        self.position = pos;
        trace!(x = pos.x, y = pos.y, "follow");
        match decision {
            Decision::Continue => Event::Continuing(pos),
            Decision::Leave { at } => {
                self.position = at;
                self.episode = None;
                self.just_left = Some(obstacle);
                debug!(obstacle, x = at.x, y = at.y, "leave, seeking goal");
                self.set_mode(Mode::Seeking);
                Event::Continuing(at)
            }
            Decision::Fail(reason) => self.fail(reason),
        }
    }

    fn fail(&mut self, reason: FailureReason) -> Event {
        self.episode = None;
        self.failure = Some(reason);
        self.set_mode(Mode::Failed);
        info!(%reason, steps = self.steps, episodes = self.episodes, "navigation failed");
        Event::Failed(reason)
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "mode change");
            self.mode = mode;
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn position(&self) -> Point2 {
        self.position
    }

    #[inline]
    pub fn start(&self) -> Point2 {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Point2 {
        self.goal
    }

    /// Where the latest following episode began.
    #[inline]
    pub fn hit_point(&self) -> Option<Point2> {
        self.hit_point
    }

    #[inline]
    pub fn leave_candidate(&self) -> Option<Point2> {
        self.leave_candidate
    }

    /// Index order of the latest following episode.
    #[inline]
    pub fn following_direction(&self) -> Option<Traversal> {
        self.following
    }

    /// Arc walked in the current episode.
    pub fn traversed(&self) -> f64 {
        self.episode.as_ref().map_or(0.0, |e| e.traversed)
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    #[inline]
    pub fn failure(&self) -> Option<FailureReason> {
        self.failure
    }

    /// Ticks taken, terminal repeats excluded.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Following episodes started so far.
    #[inline]
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    #[inline]
    pub fn policy(&self) -> PolicyKind {
        self.policy.kind()
    }

    #[inline]
    pub fn config(&self) -> &NavConfig {
        &self.cfg
    }

    pub fn obstacles(&self) -> &Arc<ObstacleSet> {
        &self.obstacles
    }
}
