use crate::math::{Aabb, Vector2};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A convex polygon shape, defined by a counter-clockwise local vertex list
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ConvexPolygon {
    vertices: Vec<Vector2>,
    centroid: Vector2,
}

impl ConvexPolygon {
    /// Creates a new convex polygon from a counter-clockwise vertex list.
    ///
    /// The winding is normalized to counter-clockwise if the caller supplied
    /// clockwise vertices.
    pub fn new(mut vertices: Vec<Vector2>) -> Self {
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        let centroid = compute_centroid(&vertices);

        Self { vertices, centroid }
    }

    /// Returns the local-space vertices
    #[inline]
    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    /// Returns the number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the local-space centroid
    #[inline]
    pub fn centroid(&self) -> Vector2 {
        self.centroid
    }

    /// Returns the world-space vertices for a body at the given pose
    pub fn world_vertices(&self, position: Vector2, rotation: f32) -> Vec<Vector2> {
        self.vertices
            .iter()
            .map(|v| position + v.rotated(rotation))
            .collect()
    }

    /// Returns a rotation-invariant local bounding box
    pub fn bounds(&self) -> Aabb {
        let r = self
            .vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0_f32, f32::max);
        Aabb::from_center_half_extents(Vector2::zero(), Vector2::new(r, r))
    }

    /// Surface factor from the polygon's bounding extents, `I = m * (w^2 + h^2) / 12`
    pub fn surface_factor(&self) -> f32 {
        match Aabb::from_points(&self.vertices) {
            Some(aabb) => {
                let e = aabb.extents();
                e.x * e.x + e.y * e.y
            }
            None => 0.0,
        }
    }

    /// Returns the area of the polygon
    pub fn area(&self) -> f32 {
        signed_area(&self.vertices)
    }
}

/// Twice-halved shoelace area; positive for counter-clockwise winding
fn signed_area(vertices: &[Vector2]) -> f32 {
    let n = vertices.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        area += a.cross(&b);
    }
    area * 0.5
}

fn compute_centroid(vertices: &[Vector2]) -> Vector2 {
    let n = vertices.len();
    if n == 0 {
        return Vector2::zero();
    }

    let area = signed_area(vertices);
    if area.abs() < crate::math::EPSILON {
        // Degenerate polygon, fall back to the vertex average
        let mut sum = Vector2::zero();
        for v in vertices {
            sum += *v;
        }
        return sum / n as f32;
    }

    let mut c = Vector2::zero();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let w = a.cross(&b);
        c += (a + b) * w;
    }
    c / (6.0 * area)
}

/// Tests whether a point lies inside a counter-clockwise contour
pub fn contains_point(vertices: &[Vector2], point: Vector2) -> bool {
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if (b - a).cross(&(point - a)) < 0.0 {
            return false;
        }
    }
    true
}
