//! 2D geometry kernel.
//!
//! Purpose
//! - Projections, segment intersection, point-in-polygon and swept
//!   line-of-sight against polygons inflated by a clearance radius.
//! - A validated `Polygon` with cached perimeter and winding.
//!
//! Conventions
//! - Points and directions are `crate::Point2` (`nalgebra::Vector2<f64>`).
//! - All functions here are pure and never fail; bad input is rejected when a
//!   `Polygon` is built.
//! - Tolerances live in `cfg` and are crate-internal.
//!
//! References
//! - O'Rourke, "Computational Geometry in C", ch. 1 and 7 (segment tests,
//!   point in polygon).

pub(crate) mod cfg;
mod kernel;
mod polygon;

pub use kernel::{
    closest_point_on_polygon, closest_point_on_segment, cross, left_perp, line_of_sight,
    point_in_polygon, right_perp, segment_distance, segment_param, segment_polygon_distance,
    segments_intersect, BoundaryPoint,
};
pub(crate) use kernel::{segment_blocked, swept_origin};
pub use polygon::Polygon;
