use crate::math::{Aabb, Vector2};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A line segment shape, defined by two local-space endpoints
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Line {
    start: Vector2,
    end: Vector2,
}

impl Line {
    /// Creates a new line between two local-space points
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Self { start, end }
    }

    /// Creates a line from the body origin to the given point
    pub fn from_origin(end: Vector2) -> Self {
        Self::new(Vector2::zero(), end)
    }

    /// Returns the local start point
    #[inline]
    pub fn start(&self) -> Vector2 {
        self.start
    }

    /// Returns the local end point
    #[inline]
    pub fn end(&self) -> Vector2 {
        self.end
    }

    /// Returns the length of the segment
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }

    /// Returns the world-space endpoints for a body at the given pose
    pub fn world_points(&self, position: Vector2, rotation: f32) -> [Vector2; 2] {
        [
            position + self.start.rotated(rotation),
            position + self.end.rotated(rotation),
        ]
    }

    /// Returns a rotation-invariant local bounding box
    pub fn bounds(&self) -> Aabb {
        let r = self.start.length().max(self.end.length());
        Aabb::from_center_half_extents(Vector2::zero(), Vector2::new(r, r))
    }

    /// Surface factor: treated as a thin rod, `I = m * len^2 / 12`
    pub fn surface_factor(&self) -> f32 {
        let len = self.length();
        len * len
    }
}
