//! Tolerances for the 2D kernel (crate-internal).

/// Determinant threshold below which two segments count as parallel.
pub(crate) const DET_EPS: f64 = 1e-12;

/// Slack on intersection parameters so that touching endpoints count.
pub(crate) const PARAM_EPS: f64 = 1e-9;

/// Distance under which a point counts as lying on a polygon boundary.
pub(crate) const ON_BOUNDARY_EPS: f64 = 1e-12;

/// Edges shorter than this are rejected at construction.
pub(crate) const MIN_EDGE_LEN: f64 = 1e-12;

/// A swept segment whose distance to a polygon is within clearance plus this
/// margin is blocked (grazing counts as contact).
pub(crate) const GRAZE_EPS: f64 = 1e-10;

/// Length of the segment prefix exempt from the grazing test; the robot may
/// sit exactly on an inflated boundary while following.
pub(crate) const LOS_START_SKIP: f64 = 1e-6;
