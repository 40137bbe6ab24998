use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::joints::Joint;
use crate::math::{Matrix2, Vector2};
use crate::Result;

// Fraction of the anchor separation corrected per step
pub(crate) const JOINT_BIAS_FACTOR: f32 = 0.3;

/// Pins a local anchor point on each body together.
///
/// The workhorse joint: a 2x2 effective-mass system solved with warm
/// starting, pulling the two world-space anchor points onto each other.
pub struct BasicJoint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    local_anchor_a: Vector2,
    local_anchor_b: Vector2,

    mass: Matrix2,
    r1: Vector2,
    r2: Vector2,
    bias: Vector2,
    accumulated_impulse: Vector2,
    softness: f32,
    bias_factor: f32,
}

impl BasicJoint {
    /// Creates a joint pinning the given body-local anchor points together
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            mass: Matrix2::zero(),
            r1: Vector2::zero(),
            r2: Vector2::zero(),
            bias: Vector2::zero(),
            accumulated_impulse: Vector2::zero(),
            softness: 0.0,
            bias_factor: JOINT_BIAS_FACTOR,
        }
    }

    /// Creates a joint pinning both bodies at a world-space point, deriving
    /// the local anchors from the bodies' current poses
    pub fn at_world_point(
        body_a: BodyHandle,
        body_b: BodyHandle,
        point: Vector2,
        bodies: &BodyStorage<Body>,
    ) -> Result<Self> {
        let a = bodies.get_body(body_a)?;
        let b = bodies.get_body(body_b)?;

        Ok(Self::new(
            body_a,
            body_b,
            (point - a.position()).rotated(-a.rotation()),
            (point - b.position()).rotated(-b.rotation()),
        ))
    }

    /// Sets the constraint softness (zero is fully rigid)
    pub fn set_softness(&mut self, softness: f32) {
        self.softness = softness.max(0.0);
    }

    /// Sets the fraction of positional error corrected per step
    pub fn set_bias_factor(&mut self, factor: f32) {
        self.bias_factor = factor;
    }

    /// Current world-space distance between the two anchor points
    pub fn anchor_separation(&self, bodies: &BodyStorage<Body>) -> Result<f32> {
        let a = bodies.get_body(self.body_a)?;
        let b = bodies.get_body(self.body_b)?;

        let p1 = a.position() + self.local_anchor_a.rotated(a.rotation());
        let p2 = b.position() + self.local_anchor_b.rotated(b.rotation());
        Ok(p1.distance(&p2))
    }

    pub(crate) fn reset_accumulated_impulse(&mut self) {
        self.accumulated_impulse = Vector2::zero();
    }
}

impl Joint for BasicJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body_a, self.body_b)
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.body_a, self.body_b)?;

        self.r1 = self.local_anchor_a.rotated(body_a.rotation());
        self.r2 = self.local_anchor_b.rotated(body_b.rotation());

        // K = invM * I + invI1 * skew(r1) + invI2 * skew(r2), plus softness
        // on the diagonal
        let inv_mass_sum = body_a.inv_mass() + body_b.inv_mass();
        let inv_i1 = body_a.inv_inertia();
        let inv_i2 = body_b.inv_inertia();
        let k = Matrix2::new(
            inv_mass_sum + inv_i1 * self.r1.y * self.r1.y + inv_i2 * self.r2.y * self.r2.y
                + self.softness,
            -inv_i1 * self.r1.x * self.r1.y - inv_i2 * self.r2.x * self.r2.y,
            -inv_i1 * self.r1.x * self.r1.y - inv_i2 * self.r2.x * self.r2.y,
            inv_mass_sum
                + inv_i1 * self.r1.x * self.r1.x
                + inv_i2 * self.r2.x * self.r2.x
                + self.softness,
        );

        self.mass = k.invert().ok_or_else(|| {
            PhysicsError::DegenerateConstraint(
                "joint effective-mass matrix is singular".into(),
            )
        })?;

        let p1 = body_a.position() + self.r1;
        let p2 = body_b.position() + self.r2;
        self.bias = (p2 - p1) * (-self.bias_factor * inv_dt);

        // Warm start
        let impulse = self.accumulated_impulse;
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

        let impulse = self.mass.multiply_vector(
            self.bias - relative_velocity - self.accumulated_impulse * self.softness,
        );

        body_a.adjust_velocity(-impulse * body_a.inv_mass());
        body_a.adjust_angular_velocity(-body_a.inv_inertia() * self.r1.cross(&impulse));
        body_b.adjust_velocity(impulse * body_b.inv_mass());
        body_b.adjust_angular_velocity(body_b.inv_inertia() * self.r2.cross(&impulse));

        self.accumulated_impulse += impulse;
        Ok(())
    }
}
