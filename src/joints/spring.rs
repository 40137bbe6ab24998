use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::joints::basic::JOINT_BIAS_FACTOR;
use crate::joints::Joint;
use crate::math::{Vector2, EPSILON};
use crate::Result;

/// A Hookean spring between two anchor points.
///
/// Within the break limits the spring applies a proportional restoring
/// impulse once per step. Stretched or squashed beyond its limits it stops
/// being springy and acts as a rigid rod at the violated limit, which keeps
/// extreme configurations from building unbounded energy.
pub struct SpringJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    local_anchor_a: Vector2,
    local_anchor_b: Vector2,

    rest_length: f32,
    stiffness: f32,
    min_length: f32,
    max_length: f32,

    broken: bool,
    axis: Vector2,
    r1: Vector2,
    r2: Vector2,
    mass: f32,
    bias: f32,
}

impl SpringJoint {
    /// Creates a spring with the given rest length and stiffness.
    ///
    /// The break limits default to half and double the rest length.
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
        rest_length: f32,
        stiffness: f32,
    ) -> Self {
        let rest_length = rest_length.max(0.0);
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            rest_length,
            stiffness: stiffness.max(0.0),
            min_length: rest_length * 0.5,
            max_length: rest_length * 2.0,
            broken: false,
            axis: Vector2::zero(),
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            mass: 0.0,
            bias: 0.0,
        }
    }

    /// Sets the lengths beyond which the spring rigidifies
    pub fn set_limits(&mut self, min_length: f32, max_length: f32) {
        self.min_length = min_length.max(0.0);
        self.max_length = max_length.max(self.min_length);
    }

    /// The spring's rest length
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }
}

impl Joint for SpringJoint {
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
                "spring joint anchors are coincident".into(),
            ));
        }
        self.axis = delta / length;

        self.broken = length < self.min_length || length > self.max_length;
        if self.broken {
            // Rigid mode: solve like a rod pinned at the violated limit
            let rn1 = self.r1.cross(&self.axis);
            let rn2 = self.r2.cross(&self.axis);
            let k = body_a.inv_mass()
                + body_b.inv_mass()
                + body_a.inv_inertia() * rn1 * rn1
                + body_b.inv_inertia() * rn2 * rn2;
            if k < EPSILON {
                return Err(PhysicsError::DegenerateConstraint(
                    "spring joint connects two immovable bodies".into(),
                ));
            }
            self.mass = 1.0 / k;

            let limit = if length < self.min_length {
                self.min_length
            } else {
                self.max_length
            };
            self.bias = -JOINT_BIAS_FACTOR * inv_dt * (length - limit);
            return Ok(());
        }

        // Springy mode: a single Hookean impulse, applied here rather than
        // per iteration so the stiffness is independent of iteration count
        let dt = if inv_dt > 0.0 { 1.0 / inv_dt } else { 0.0 };
        let force = -self.stiffness * (length - self.rest_length);
        let impulse = self.axis * (force * dt);

        body_a.adjust_velocity(-impulse * body_a.inv_mass());
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.r1.cross(&impulse));
        body_b.adjust_velocity(impulse * body_b.inv_mass());
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.r2.cross(&impulse));

        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        if !self.broken {
            return Ok(());
        }

        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let relative_velocity = body_b.velocity()
            + Vector2::cross_scalar(body_b.angular_velocity(), &self.r2)
            - body_a.velocity()
            - Vector2::cross_scalar(body_a.angular_velocity(), &self.r1);
        let vn = relative_velocity.dot(&self.axis);
        let impulse = self.axis * (self.mass * (self.bias - vn));

        body_a.adjust_velocity(-impulse * body_a.inv_mass());
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.r1.cross(&impulse));
        body_b.adjust_velocity(impulse * body_b.inv_mass());
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.r2.cross(&impulse));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::Storage;
    use crate::shapes::Circle;

    fn sprung(distance: f32) -> (BodyStorage<Body>, SpringJoint, BodyHandle) {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let anchor = bodies.add(Body::new_static(Circle::new(0.1).into()));

        let mut bob = Body::new(Circle::new(0.5).into(), 1.0).unwrap();
        bob.set_position(Vector2::new(distance, 0.0));
        let bob_handle = bodies.add(bob);

        let joint = SpringJoint::new(
            anchor,
            bob_handle,
            Vector2::zero(),
            Vector2::zero(),
            2.0,
            50.0,
        );
        (bodies, joint, bob_handle)
    }

    #[test]
    fn test_stretched_spring_pulls_back() {
        let (mut bodies, mut joint, bob) = sprung(3.0);

        joint.pre_step(&mut bodies, 60.0).unwrap();
        assert!(!joint.broken);

        // Restoring impulse toward the anchor
        assert!(bodies.get(bob).unwrap().velocity().x < 0.0);
    }

    #[test]
    fn test_compressed_spring_pushes_out() {
        let (mut bodies, mut joint, bob) = sprung(1.5);

        joint.pre_step(&mut bodies, 60.0).unwrap();
        assert!(bodies.get(bob).unwrap().velocity().x > 0.0);
    }

    #[test]
    fn test_at_rest_length_no_impulse() {
        let (mut bodies, mut joint, bob) = sprung(2.0);

        joint.pre_step(&mut bodies, 60.0).unwrap();
        assert_eq!(bodies.get(bob).unwrap().velocity(), Vector2::zero());
    }

    #[test]
    fn test_overstretched_spring_rigidifies() {
        let (mut bodies, mut joint, bob) = sprung(5.0);
        bodies
            .get_mut(bob)
            .unwrap()
            .set_velocity(Vector2::new(1.0, 0.0));

        joint.pre_step(&mut bodies, 60.0).unwrap();
        assert!(joint.broken);

        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }
        // Rigid pull toward the max-length limit
        assert!(bodies.get(bob).unwrap().velocity().x < 0.0);
    }
}
