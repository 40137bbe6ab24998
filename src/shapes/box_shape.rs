use crate::math::{Aabb, Matrix2, Vector2};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A rectangle shape centered on its body's position
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoxShape {
    /// Full width and height
    size: Vector2,
}

impl BoxShape {
    /// Creates a new box with the given full width and height
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vector2::new(width.max(0.0), height.max(0.0)),
        }
    }

    /// Returns the full size of the box
    #[inline]
    pub fn size(&self) -> Vector2 {
        self.size
    }

    /// Returns the half extents of the box
    #[inline]
    pub fn half_extents(&self) -> Vector2 {
        self.size * 0.5
    }

    /// Returns the four world-space corners, counter-clockwise
    pub fn points(&self, position: Vector2, rotation: f32) -> [Vector2; 4] {
        let h = self.half_extents();
        let rot = Matrix2::rotation(rotation);

        [
            position + rot.multiply_vector(Vector2::new(-h.x, -h.y)),
            position + rot.multiply_vector(Vector2::new(h.x, -h.y)),
            position + rot.multiply_vector(Vector2::new(h.x, h.y)),
            position + rot.multiply_vector(Vector2::new(-h.x, h.y)),
        ]
    }

    /// Returns a rotation-invariant local bounding box (the box's circumcircle)
    pub fn bounds(&self) -> Aabb {
        let r = self.half_extents().length();
        Aabb::from_center_half_extents(Vector2::zero(), Vector2::new(r, r))
    }

    /// Surface factor chosen so `I = m * (w^2 + h^2) / 12`
    pub fn surface_factor(&self) -> f32 {
        self.size.x * self.size.x + self.size.y * self.size.y
    }
}
