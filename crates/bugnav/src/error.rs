//! Error types for session construction.
//!
//! Navigation outcomes (`GoalUnreachable`, `IterationLimit`) are not errors;
//! they travel in `nav::Event::Failed`.

use std::fmt;

use thiserror::Error;

/// Why a polygon was rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("edge {edge} has zero length")]
    ZeroLengthEdge { edge: usize },
    #[error("vertex {vertex} is not finite")]
    NonFinite { vertex: usize },
}

/// Which end of the run is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::Goal => f.write_str("goal"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NavError {
    #[error("obstacle {obstacle}: {source}")]
    InvalidGeometry {
        obstacle: usize,
        #[source]
        source: GeometryError,
    },
    #[error("{which} lies within the inflated obstacle {obstacle}")]
    StartOrGoalInCollision { which: Endpoint, obstacle: usize },
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl NavError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        NavError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
