//! External force sources, applied at the start of every step before
//! velocity integration.

use crate::bodies::Body;
use crate::core::storage::{BodyStorage, Storage};
use crate::core::BodyHandle;
use crate::math::Vector2;

/// Something that feeds forces into bodies every step
pub trait ForceSource {
    /// Accumulates forces into the bodies for this step
    fn apply(&mut self, bodies: &mut BodyStorage<Body>, dt: f32);

    /// Returns the name of this source, for diagnostics
    fn source_type(&self) -> &'static str;
}

/// A uniform force applied to every dynamic body, such as wind
pub struct Wind {
    force: Vector2,
}

impl Wind {
    /// Creates a wind force
    pub fn new(force: Vector2) -> Self {
        Self { force }
    }

    /// Changes the wind force
    pub fn set_force(&mut self, force: Vector2) {
        self.force = force;
    }
}

impl ForceSource for Wind {
    fn apply(&mut self, bodies: &mut BodyStorage<Body>, _dt: f32) {
        for (_, body) in bodies.iter_mut() {
            if body.is_enabled() && !body.is_static() {
                body.add_force(self.force);
            }
        }
    }

    fn source_type(&self) -> &'static str {
        "Wind"
    }
}

/// A constant force applied to a single body, such as a thruster
pub struct ConstantForce {
    body: BodyHandle,
    force: Vector2,
}

impl ConstantForce {
    /// Creates a constant force acting on the given body
    pub fn new(body: BodyHandle, force: Vector2) -> Self {
        Self { body, force }
    }
}

impl ForceSource for ConstantForce {
    fn apply(&mut self, bodies: &mut BodyStorage<Body>, _dt: f32) {
        if let Some(body) = bodies.get_mut(self.body) {
            if body.is_enabled() {
                body.add_force(self.force);
            }
        }
    }

    fn source_type(&self) -> &'static str {
        "ConstantForce"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Circle;

    #[test]
    fn test_wind_skips_static_bodies() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let dynamic = bodies.add(Body::new(Circle::new(1.0).into(), 1.0).unwrap());
        let fixed = bodies.add(Body::new_static(Circle::new(1.0).into()));

        let mut wind = Wind::new(Vector2::new(3.0, 0.0));
        wind.apply(&mut bodies, 1.0 / 60.0);

        assert_eq!(bodies.get(dynamic).unwrap().force(), Vector2::new(3.0, 0.0));
        assert_eq!(bodies.get(fixed).unwrap().force(), Vector2::zero());
    }

    #[test]
    fn test_constant_force_targets_one_body() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let target = bodies.add(Body::new(Circle::new(1.0).into(), 1.0).unwrap());
        let other = bodies.add(Body::new(Circle::new(1.0).into(), 1.0).unwrap());

        let mut thruster = ConstantForce::new(target, Vector2::new(0.0, -5.0));
        thruster.apply(&mut bodies, 1.0 / 60.0);

        assert_eq!(bodies.get(target).unwrap().force(), Vector2::new(0.0, -5.0));
        assert_eq!(bodies.get(other).unwrap().force(), Vector2::zero());
    }
}
