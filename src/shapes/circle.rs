use crate::math::{Aabb, Vector2};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A circle shape centered on its body's position
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Circle {
    radius: f32,
}

impl Circle {
    /// Creates a new circle with the given radius
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    /// Returns the radius of the circle
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns the local-space bounding box
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(Vector2::zero(), Vector2::new(self.radius, self.radius))
    }

    /// Surface factor chosen so `I = m * factor / 12 = m * r^2 / 2`
    pub fn surface_factor(&self) -> f32 {
        6.0 * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inertia_matches_closed_form() {
        let circle = Circle::new(2.0);
        let mass = 3.0;
        let inertia = mass * circle.surface_factor() / 12.0;

        // I = m r^2 / 2 for a solid disc
        assert_relative_eq!(inertia, mass * 4.0 / 2.0);
    }
}
