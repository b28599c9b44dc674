//! bugnav: reactive bug-style local navigation around polygonal obstacles.
//!
//! A point/disc robot alternates between moving straight at the goal and
//! walking the clearance-offset boundary of whatever obstacle blocked it.
//! Only local geometry is consulted: no global map, no visibility graph.
//!
//! Modules
//! - `geom`: 2D kernel (projections, intersections, line of sight) and validated polygons.
//! - `obstacles`: immutable polygon set plus the robot clearance radius.
//! - `sensor`: simulated 360° range scan.
//! - `cursor`: walker along the clearance-offset boundary.
//! - `nav`: mode state machine and the three leave policies.
//! - `driver`: step loop, caller-owned path, run summaries.
//! - `config`, `error`, `scenario`: run parameters, error types, scenario files and random fields.

pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod geom;
pub mod nav;
pub mod obstacles;
pub mod scenario;
pub mod sensor;

/// Points and directions in the plane.
pub type Point2 = nalgebra::Vector2<f64>;

/// Crate version (from Cargo).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    //! Common imports for downstream users.
    pub use crate::config::{NavConfig, PolicyKind, SensorCfg};
    pub use crate::cursor::{BoundaryCursor, Hand, Traversal};
    pub use crate::driver::{drive, Outcome, Path, RunSummary};
    pub use crate::error::{Endpoint, GeometryError, NavError};
    pub use crate::geom::Polygon;
    pub use crate::nav::{Event, FailureReason, Mode, NavigationSession};
    pub use crate::obstacles::ObstacleSet;
    pub use crate::scenario::Scenario;
    pub use crate::Point2;
}
