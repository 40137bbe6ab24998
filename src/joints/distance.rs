use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::joints::basic::JOINT_BIAS_FACTOR;
use crate::joints::Joint;
use crate::math::{Vector2, EPSILON};
use crate::Result;

/// Keeps two anchor points at a fixed distance (a rigid rod).
///
/// The constraint acts along the line between the anchors in both
/// directions, unlike [`crate::joints::SlideJoint`] which is one sided.
pub struct DistanceJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    local_anchor_a: Vector2,
    local_anchor_b: Vector2,
    target_distance: f32,

    axis: Vector2,
    r1: Vector2,
    r2: Vector2,
    mass: f32,
    bias: f32,
    accumulated_impulse: f32,
}

impl DistanceJoint {
    /// Creates a rod holding the anchors at the given distance
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
        target_distance: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            target_distance: target_distance.max(0.0),
            axis: Vector2::zero(),
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            mass: 0.0,
            bias: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    /// The held distance
    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    /// Changes the held distance
    pub fn set_target_distance(&mut self, distance: f32) {
        self.target_distance = distance.max(0.0);
    }
}

impl Joint for DistanceJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        self.r1 = self.local_anchor_a.rotated(body_a.rotation());
        self.r2 = self.local_anchor_b.rotated(body_b.rotation());

        let p1 = body_a.position() + self.r1;
        let p2 = body_b.position() + self.r2;
        let delta = p2 - p1;
        let length = delta.length();
        if length < EPSILON {
            return Err(PhysicsError::DegenerateConstraint(
                "distance joint anchors are coincident".into(),
            ));
        }
        self.axis = delta / length;

        let rn1 = self.r1.cross(&self.axis);
        let rn2 = self.r2.cross(&self.axis);
        let k = body_a.inv_mass()
            + body_b.inv_mass()
            + body_a.inv_inertia() * rn1 * rn1
            + body_b.inv_inertia() * rn2 * rn2;
        if k < EPSILON {
            return Err(PhysicsError::DegenerateConstraint(
                "distance joint connects two immovable bodies".into(),
            ));
        }
        self.mass = 1.0 / k;

        self.bias = -JOINT_BIAS_FACTOR * inv_dt * (length - self.target_distance);

        // Warm start along the current axis
        let impulse = self.axis * self.accumulated_impulse;
        body_a.adjust_velocity(-impulse * body_a.inv_mass());
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.r1.cross(&impulse));
        body_b.adjust_velocity(impulse * body_b.inv_mass());
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.r2.cross(&impulse));

        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let relative_velocity = body_b.velocity()
            + Vector2::cross_scalar(body_b.angular_velocity(), &self.r2)
            - body_a.velocity()
            - Vector2::cross_scalar(body_a.angular_velocity(), &self.r1);
        let vn = relative_velocity.dot(&self.axis);

        let impulse_magnitude = self.mass * (self.bias - vn);
        let impulse = self.axis * impulse_magnitude;

        body_a.adjust_velocity(-impulse * body_a.inv_mass());
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.r1.cross(&impulse));
        body_b.adjust_velocity(impulse * body_b.inv_mass());
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.r2.cross(&impulse));

        self.accumulated_impulse += impulse_magnitude;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::Storage;
    use crate::shapes::Circle;

    #[test]
    fn test_rod_resists_stretching() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();

        let anchor = bodies.add(Body::new_static(Circle::new(0.1).into()));

        let mut hanging = Body::new(Circle::new(0.5).into(), 1.0).unwrap();
        hanging.set_position(Vector2::new(0.0, 2.0));
        hanging.set_velocity(Vector2::new(0.0, 1.0));
        let hanging_handle = bodies.add(hanging);

        let mut joint = DistanceJoint::new(
            anchor,
            hanging_handle,
            Vector2::zero(),
            Vector2::zero(),
            2.0,
        );

        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        // The stretching velocity along the rod must be gone
        let v = bodies.get(hanging_handle).unwrap().velocity();
        assert!(v.y.abs() < 1.0e-3);
    }

    #[test]
    fn test_two_static_bodies_is_fatal() {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let a = bodies.add(Body::new_static(Circle::new(0.5).into()));
        let mut far = Body::new_static(Circle::new(0.5).into());
        far.set_position(Vector2::new(3.0, 0.0));
        let b = bodies.add(far);

        let mut joint = DistanceJoint::new(a, b, Vector2::zero(), Vector2::zero(), 1.0);
        assert!(joint.pre_step(&mut bodies, 60.0).is_err());
    }
}
