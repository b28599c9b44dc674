//! Scenario descriptions: obstacles, clearance, start, goal and run config.
//!
//! A `Scenario` is plain serde data (the CLI stores it as JSON). Validation
//! happens when it is turned into an [`ObstacleSet`] or a session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{NavConfig, PolicyKind};
use crate::error::NavError;
use crate::nav::NavigationSession;
use crate::obstacles::ObstacleSet;
use crate::Point2;

pub mod rand;

/// Clearance used when a scenario file omits it.
pub const DEFAULT_CLEARANCE: f64 = 0.1;

fn default_clearance() -> f64 {
    DEFAULT_CLEARANCE
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Vertex lists, one per polygon, either winding.
    pub obstacles: Vec<Vec<[f64; 2]>>,
    #[serde(default = "default_clearance")]
    pub clearance: f64,
    pub start: [f64; 2],
    pub goal: [f64; 2],
    #[serde(default)]
    pub config: NavConfig,
}

impl Scenario {
    pub fn new(
        obstacles: Vec<Vec<[f64; 2]>>,
        clearance: f64,
        start: [f64; 2],
        goal: [f64; 2],
    ) -> Self {
        Self {
            obstacles,
            clearance,
            start,
            goal,
            config: NavConfig::default(),
        }
    }

    #[inline]
    pub fn start_point(&self) -> Point2 {
        Point2::new(self.start[0], self.start[1])
    }

    #[inline]
    pub fn goal_point(&self) -> Point2 {
        Point2::new(self.goal[0], self.goal[1])
    }

    pub fn obstacle_set(&self) -> Result<ObstacleSet, NavError> {
        let lists = self
            .obstacles
            .iter()
            .map(|poly| poly.iter().map(|&[x, y]| Point2::new(x, y)).collect::<Vec<_>>());
        ObstacleSet::from_vertices(lists, self.clearance)
    }

    /// Session with the scenario's own config.
    pub fn session(&self) -> Result<NavigationSession, NavError> {
        self.session_with_policy(self.config.policy)
    }

    pub fn session_with_policy(&self, policy: PolicyKind) -> Result<NavigationSession, NavError> {
        let obstacles = Arc::new(self.obstacle_set()?);
        NavigationSession::new(
            obstacles,
            self.start_point(),
            self.goal_point(),
            self.config.clone().with_policy(policy),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;

    #[test]
    fn minimal_json_gets_defaults() {
        let s: Scenario = serde_json::from_str(
            r#"{"obstacles": [[[0,0],[2,0],[2,2],[0,2]]], "start": [-3,1], "goal": [5,1]}"#,
        )
        .unwrap();
        assert_eq!(s.clearance, DEFAULT_CLEARANCE);
        assert_eq!(s.config, NavConfig::default());
        let set = s.obstacle_set().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.polygon(0).perimeter(), 8.0);
    }

    #[test]
    fn policy_override_keeps_other_settings() {
        let mut s = Scenario::new(vec![], 0.2, [0.0, 0.0], [1.0, 0.0]);
        s.config.step_size = 0.01;
        let session = s.session_with_policy(PolicyKind::C).unwrap();
        assert_eq!(session.policy(), PolicyKind::C);
        assert_eq!(session.config().step_size, 0.01);
    }

    #[test]
    fn degenerate_polygon_reports_its_index() {
        let s = Scenario::new(
            vec![
                vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
                vec![[5.0, 5.0], [5.0, 5.0], [6.0, 5.0]],
            ],
            0.1,
            [-3.0, 0.0],
            [3.0, 0.0],
        );
        match s.session() {
            Err(NavError::InvalidGeometry { obstacle, source }) => {
                assert_eq!(obstacle, 1);
                assert_eq!(source, GeometryError::ZeroLengthEdge { edge: 0 });
            }
            other => panic!("expected InvalidGeometry, got {other:?}"),
        }
    }
}
