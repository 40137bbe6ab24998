//! Angular joints: bounded, fixed, and springy control of the relative
//! rotation between two bodies.

use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::joints::basic::JOINT_BIAS_FACTOR;
use crate::joints::Joint;
use crate::math::EPSILON;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Inactive,
    Lower,
    Upper,
}

/// Keeps the relative rotation of two bodies within an angle range.
///
/// Only the violated bound is enforced, one sided, with an optional bounce
/// factor that reflects part of the angular approach velocity. Like the
/// slide joint, the accumulated impulse resets when the active bound
/// changes.
pub struct AngleJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    min_angle: f32,
    max_angle: f32,
    bounce: f32,

    bound: Bound,
    mass: f32,
    bias: f32,
    bounce_bias: f32,
    accumulated_impulse: f32,
}

impl AngleJoint {
    /// Creates a joint bounding the relative rotation `rot_b - rot_a`
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, min_angle: f32, max_angle: f32) -> Self {
        Self {
            body_a,
            body_b,
            min_angle,
            max_angle: max_angle.max(min_angle),
            bounce: 0.0,
            bound: Bound::Inactive,
            mass: 0.0,
            bias: 0.0,
            bounce_bias: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    /// Sets how much of the angular approach velocity is reflected when a
    /// bound is struck (0 = dead stop)
    pub fn set_bounce(&mut self, bounce: f32) {
        self.bounce = bounce.max(0.0);
    }

    /// The allowed relative-angle range
    pub fn range(&self) -> (f32, f32) {
        (self.min_angle, self.max_angle)
    }
}

impl Joint for AngleJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let relative = body_b.rotation() - body_a.rotation();
        let bound = if relative < self.min_angle {
            Bound::Lower
        } else if relative > self.max_angle {
            Bound::Upper
        } else {
            Bound::Inactive
        };
        if bound != self.bound {
            self.accumulated_impulse = 0.0;
            self.bound = bound;
        }
        if self.bound == Bound::Inactive {
            return Ok(());
        }

        let k = body_a.inv_inertia() + body_b.inv_inertia();
        if k < EPSILON {
            // Neither body can rotate; nothing to solve
            self.bound = Bound::Inactive;
            return Ok(());
        }
        self.mass = 1.0 / k;

        let violated = match self.bound {
            Bound::Lower => self.min_angle,
            _ => self.max_angle,
        };
        self.bias = -JOINT_BIAS_FACTOR * inv_dt * (relative - violated);

        // Bounce off the bound when approaching fast
        let relative_angular = body_b.angular_velocity() - body_a.angular_velocity();
        let approaching = match self.bound {
            Bound::Lower => relative_angular < 0.0,
            _ => relative_angular > 0.0,
        };
        self.bounce_bias = if approaching {
            -self.bounce * relative_angular
        } else {
            0.0
        };

        // Warm start
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.accumulated_impulse);
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.accumulated_impulse);

        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        if self.bound == Bound::Inactive {
            return Ok(());
        }

        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let relative_angular = body_b.angular_velocity() - body_a.angular_velocity();
        let delta = self.mass * (self.bias + self.bounce_bias - relative_angular);

        // Lower bound only ever pushes the relative angle up, upper bound
        // only down
        let old = self.accumulated_impulse;
        self.accumulated_impulse = match self.bound {
            Bound::Lower => (old + delta).max(0.0),
            _ => (old + delta).min(0.0),
        };
        let applied = self.accumulated_impulse - old;

        body_a.adjust_angular_velocity(-body_a.inv_inertia() * applied);
        body_b.adjust_angular_velocity(body_b.inv_inertia() * applied);

        Ok(())
    }
}

/// Pins the relative rotation of two bodies to a fixed angle
pub struct FixedAngleJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    target_angle: f32,

    mass: f32,
    bias: f32,
}

impl FixedAngleJoint {
    /// Creates a joint holding `rot_b - rot_a` at the target angle
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, target_angle: f32) -> Self {
        Self {
            body_a,
            body_b,
            target_angle,
            mass: 0.0,
            bias: 0.0,
        }
    }
}

impl Joint for FixedAngleJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let k = body_a.inv_inertia() + body_b.inv_inertia();
        if k < EPSILON {
            self.mass = 0.0;
            return Ok(());
        }
        self.mass = 1.0 / k;

        let relative = body_b.rotation() - body_a.rotation();
        self.bias = -JOINT_BIAS_FACTOR * inv_dt * (relative - self.target_angle);
        Ok(())
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        if self.mass == 0.0 {
            return Ok(());
        }

        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        let relative_angular = body_b.angular_velocity() - body_a.angular_velocity();
        let impulse = self.mass * (self.bias - relative_angular);

        body_a.adjust_angular_velocity(-body_a.inv_inertia() * impulse);
        body_b.adjust_angular_velocity(body_b.inv_inertia() * impulse);
        Ok(())
    }
}

/// A rotational spring driving the relative rotation toward a rest angle
pub struct SpringyAngleJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    rest_angle: f32,
    stiffness: f32,
}

impl SpringyAngleJoint {
    /// Creates a rotational spring with the given rest angle and stiffness
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, rest_angle: f32, stiffness: f32) -> Self {
        Self {
            body_a,
            body_b,
            rest_angle,
            stiffness: stiffness.max(0.0),
        }
    }
}

impl Joint for SpringyAngleJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        // Proportional torque impulse, applied once per step
        let dt = if inv_dt > 0.0 { 1.0 / inv_dt } else { 0.0 };
        let relative = body_b.rotation() - body_a.rotation();
        let impulse = -self.stiffness * (relative - self.rest_angle) * dt;

        body_a.adjust_angular_velocity(-body_a.inv_inertia() * impulse);
        body_b.adjust_angular_velocity(body_b.inv_inertia() * impulse);
        Ok(())
    }

    fn apply_impulse(&mut self, _bodies: &mut BodyStorage<Body>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::Storage;
    use crate::math::Vector2;
    use crate::shapes::BoxShape;

    fn hinged() -> (BodyStorage<Body>, BodyHandle, BodyHandle) {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let base = bodies.add(Body::new_static(BoxShape::new(1.0, 1.0).into()));

        let mut arm = Body::new(BoxShape::new(2.0, 0.5).into(), 1.0).unwrap();
        arm.set_position(Vector2::new(2.0, 0.0));
        let arm_handle = bodies.add(arm);

        (bodies, base, arm_handle)
    }

    #[test]
    fn test_within_bounds_is_free() {
        let (mut bodies, base, arm) = hinged();
        bodies.get_mut(arm).unwrap().set_angular_velocity(1.0);

        let mut joint = AngleJoint::new(base, arm, -1.0, 1.0);
        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        assert_eq!(bodies.get(arm).unwrap().angular_velocity(), 1.0);
    }

    #[test]
    fn test_upper_bound_pushes_back() {
        let (mut bodies, base, arm) = hinged();
        {
            let body = bodies.get_mut(arm).unwrap();
            body.set_rotation(1.2);
            body.set_angular_velocity(1.0);
        }

        let mut joint = AngleJoint::new(base, arm, -1.0, 1.0);
        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        assert!(bodies.get(arm).unwrap().angular_velocity() < 0.0);
    }

    #[test]
    fn test_bounce_reflects_approach() {
        let (mut bodies, base, arm) = hinged();
        {
            let body = bodies.get_mut(arm).unwrap();
            body.set_rotation(1.2);
            body.set_angular_velocity(2.0);
        }

        let mut joint = AngleJoint::new(base, arm, -1.0, 1.0);
        joint.set_bounce(0.5);
        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        // Part of the approach velocity comes back out
        assert!(bodies.get(arm).unwrap().angular_velocity() < -0.5);
    }

    #[test]
    fn test_fixed_angle_corrects_error() {
        let (mut bodies, base, arm) = hinged();
        bodies.get_mut(arm).unwrap().set_rotation(0.5);

        let mut joint = FixedAngleJoint::new(base, arm, 0.0);
        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        // Angular velocity drives the relative angle back toward zero
        assert!(bodies.get(arm).unwrap().angular_velocity() < 0.0);
    }

    #[test]
    fn test_springy_angle_torques_toward_rest() {
        let (mut bodies, base, arm) = hinged();
        bodies.get_mut(arm).unwrap().set_rotation(0.5);

        let mut joint = SpringyAngleJoint::new(base, arm, 0.0, 10.0);
        joint.pre_step(&mut bodies, 60.0).unwrap();

        assert!(bodies.get(arm).unwrap().angular_velocity() < 0.0);
    }
}
