use super::cfg::MIN_EDGE_LEN;
use super::kernel::{closest_point_on_polygon, cross, point_in_polygon, BoundaryPoint};
use crate::error::GeometryError;
use crate::Point2;

/// Simple polygon, implicitly closed. Perimeter and signed area are cached.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2>,
    perimeter: f64,
    signed_area: f64,
}

impl Polygon {
    /// Validate and build. Rejects fewer than 3 vertices, non-finite
    /// coordinates, and zero-length edges (including a repeated closing vertex).
    pub fn new(vertices: Vec<Point2>) -> Result<Self, GeometryError> {
        let n = vertices.len();
        if n < 3 {
            return Err(GeometryError::TooFewVertices(n));
        }
        if let Some(vertex) = vertices
            .iter()
            .position(|v| !(v.x.is_finite() && v.y.is_finite()))
        {
            return Err(GeometryError::NonFinite { vertex });
        }
        let mut perimeter = 0.0;
        let mut twice_area = 0.0;
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let len = (b - a).norm();
            if len <= MIN_EDGE_LEN {
                return Err(GeometryError::ZeroLengthEdge { edge: i });
            }
            perimeter += len;
            twice_area += cross(a, b);
        }
        Ok(Self {
            vertices,
            perimeter,
            signed_area: 0.5 * twice_area,
        })
    }

    /// Build from `[x, y]` pairs.
    pub fn from_xy(points: &[[f64; 2]]) -> Result<Self, GeometryError> {
        Self::new(points.iter().map(|p| Point2::new(p[0], p[1])).collect())
    }

    #[inline]
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex `i`, wrapping around.
    #[inline]
    pub fn vertex(&self, i: usize) -> Point2 {
        self.vertices[i % self.vertices.len()]
    }

    /// Endpoints of edge `i` (vertex `i` to vertex `i + 1`).
    #[inline]
    pub fn edge(&self, i: usize) -> (Point2, Point2) {
        (self.vertex(i), self.vertex(i + 1))
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        (0..self.len()).map(move |i| self.edge(i))
    }

    /// Index of the edge ending at vertex `i`.
    #[inline]
    pub fn prev_edge(&self, i: usize) -> usize {
        (i + self.len() - 1) % self.len()
    }

    #[inline]
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Positive for counter-clockwise vertex order.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    #[inline]
    pub fn is_ccw(&self) -> bool {
        self.signed_area > 0.0
    }

    pub fn closest_point(&self, p: Point2) -> BoundaryPoint {
        closest_point_on_polygon(p, self)
    }

    pub fn contains(&self, p: Point2) -> bool {
        point_in_polygon(p, self)
    }
}
