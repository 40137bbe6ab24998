use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::joints::basic::JOINT_BIAS_FACTOR;
use crate::joints::Joint;
use crate::math::{Vector2, EPSILON};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Inactive,
    /// Below the minimum distance; the joint pushes the anchors apart
    Push,
    /// Beyond the maximum distance; the joint pulls them together
    Pull,
}

/// Lets two anchor points slide freely within a distance range.
///
/// Only the violated bound is enforced, and only in the violating
/// direction. The accumulated impulse is reset whenever the active side
/// changes, because an impulse accumulated while pushing must not warm
/// start a pull.
pub struct SlideJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    local_anchor_a: Vector2,
    local_anchor_b: Vector2,
    min_distance: f32,
    max_distance: f32,

    side: Side,
    axis: Vector2,
    r1: Vector2,
    r2: Vector2,
    mass: f32,
    bias: f32,
    accumulated_impulse: f32,
}

impl SlideJoint {
    /// Creates a slide joint with the given distance range
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
        min_distance: f32,
        max_distance: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            min_distance: min_distance.max(0.0),
            max_distance: max_distance.max(min_distance),
            side: Side::Inactive,
            axis: Vector2::zero(),
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            mass: 0.0,
            bias: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    /// The allowed distance range
    pub fn range(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }
}

impl Joint for SlideJoint {
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

        let side = if length < self.min_distance {
            Side::Push
        } else if length > self.max_distance {
            Side::Pull
        } else {
            Side::Inactive
        };
        if side != self.side {
            self.accumulated_impulse = 0.0;
            self.side = side;
        }
        if self.side == Side::Inactive {
            return Ok(());
        }

        if length < EPSILON {
            return Err(PhysicsError::DegenerateConstraint(
                "slide joint anchors are coincident".into(),
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
                "slide joint connects two immovable bodies".into(),
            ));
        }
        self.mass = 1.0 / k;

        let bound = match self.side {
            Side::Push => self.min_distance,
            Side::Pull => self.max_distance,
            Side::Inactive => unreachable!(),
        };
        self.bias = -JOINT_BIAS_FACTOR * inv_dt * (length - bound);

        // Warm start
        let impulse = self.axis * self.accumulated_impulse;
        body_a.adjust_velocity(-impulse * body_a.inv_mass());
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.r1.cross(&impulse));
        body_b.adjust_velocity(impulse * body_b.inv_mass());
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.r2.cross(&impulse));

        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        if self.side == Side::Inactive {
            return Ok(());
        }

        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let relative_velocity = body_b.velocity()
            + Vector2::cross_scalar(body_b.angular_velocity(), &self.r2)
            - body_a.velocity()
            - Vector2::cross_scalar(body_a.angular_velocity(), &self.r1);
        let vn = relative_velocity.dot(&self.axis);
        let delta = self.mass * (self.bias - vn);

        // One-sided accumulated clamp: positive impulses push apart,
        // negative pull together
        let old = self.accumulated_impulse;
        self.accumulated_impulse = match self.side {
            Side::Push => (old + delta).max(0.0),
            Side::Pull => (old + delta).min(0.0),
            Side::Inactive => return Ok(()),
        };
        let applied = self.accumulated_impulse - old;

        let impulse = self.axis * applied;
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

    fn tethered(distance: f32, velocity: Vector2) -> (BodyStorage<Body>, SlideJoint, BodyHandle) {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let anchor = bodies.add(Body::new_static(Circle::new(0.1).into()));

        let mut roaming = Body::new(Circle::new(0.5).into(), 1.0).unwrap();
        roaming.set_position(Vector2::new(distance, 0.0));
        roaming.set_velocity(velocity);
        let roaming_handle = bodies.add(roaming);

        let joint = SlideJoint::new(
            anchor,
            roaming_handle,
            Vector2::zero(),
            Vector2::zero(),
            1.0,
            3.0,
        );
        (bodies, joint, roaming_handle)
    }

    #[test]
    fn test_inside_range_is_free() {
        let (mut bodies, mut joint, body) = tethered(2.0, Vector2::new(1.0, 0.0));

        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        // No bound violated, velocity untouched
        assert_eq!(bodies.get(body).unwrap().velocity(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_max_bound_stops_separation() {
        let (mut bodies, mut joint, body) = tethered(3.5, Vector2::new(2.0, 0.0));

        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        // Past the max, still separating: the joint pulls back
        assert!(bodies.get(body).unwrap().velocity().x < 0.0);
    }

    #[test]
    fn test_min_bound_pushes_apart() {
        let (mut bodies, mut joint, body) = tethered(0.5, Vector2::new(-1.0, 0.0));

        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        assert!(bodies.get(body).unwrap().velocity().x > 0.0);
    }

    #[test]
    fn test_side_change_resets_accumulated_impulse() {
        let (mut bodies, mut joint, body) = tethered(3.5, Vector2::new(2.0, 0.0));

        joint.pre_step(&mut bodies, 60.0).unwrap();
        joint.apply_impulse(&mut bodies).unwrap();
        assert!(joint.accumulated_impulse < 0.0);

        // Teleport inside the minimum and re-prepare
        bodies
            .get_mut(body)
            .unwrap()
            .set_position(Vector2::new(0.5, 0.0));
        joint.pre_step(&mut bodies, 60.0).unwrap();
        assert_eq!(joint.accumulated_impulse, 0.0);
    }
}
