use crate::bodies::BodyFlags;
use crate::core::BodyHandle;
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::shapes::Shape;
use crate::Result;

/// A rigid body for 2D physics simulation.
///
/// Besides the usual velocity channel, every body carries a *biased*
/// velocity/angular-velocity pair that is used exclusively for penetration
/// correction. Bias impulses accumulate there during solving, move the body
/// during position integration, and are zeroed afterwards, so positional
/// correction never pollutes the velocity seen by restitution.
pub struct Body {
    /// The body's collision shape
    shape: Shape,

    /// The body's position in world space
    position: Vector2,

    /// The body's rotation in radians
    rotation: f32,

    /// The body's linear velocity
    velocity: Vector2,

    /// The body's angular velocity
    angular_velocity: f32,

    /// Velocity channel used only for positional correction
    biased_velocity: Vector2,

    /// Angular velocity channel used only for positional correction
    biased_angular_velocity: f32,

    /// Accumulated force, cleared every step
    force: Vector2,

    /// Accumulated torque, cleared every step
    torque: f32,

    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,

    /// Inverse terms to restore when resting ends
    original_inv_mass: f32,
    original_inv_inertia: f32,

    /// Surface friction coefficient
    friction: f32,

    /// Coefficient of restitution
    restitution: f32,

    /// Upper bound on the velocity magnitude, applied after integration
    max_velocity: f32,

    /// Exclusion bits; two bodies collide only if their masks do not overlap
    bitmask: u64,

    /// Bodies that must never collide with this one
    excluded: Vec<BodyHandle>,

    /// Opaque user tag
    user_data: u64,

    flags: BodyFlags,

    /// Bodies currently in contact, rebuilt each frame for resting detection
    touching: Vec<BodyHandle>,

    /// Position at frame start, for the resting position tolerance
    old_position: Vector2,

    /// Rotation at frame start, for the resting rotation tolerance
    old_rotation: f32,
}

impl Body {
    /// Creates a new dynamic body with the given shape and mass.
    ///
    /// Fails fast on non-positive mass rather than letting a divide-by-zero
    /// propagate through the solver.
    pub fn new(shape: Shape, mass: f32) -> Result<Self> {
        if mass <= 0.0 || !mass.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "body mass must be positive and finite, got {}",
                mass
            )));
        }

        let mut body = Self::raw(shape);
        body.set_mass(mass);
        Ok(body)
    }

    /// Creates a new static (infinite mass) body with the given shape
    pub fn new_static(shape: Shape) -> Self {
        let mut body = Self::raw(shape);
        body.mass = f32::INFINITY;
        body.flags.insert(BodyFlags::STATIC);
        body.flags.remove(BodyFlags::GRAVITY_AFFECTED);
        body
    }

    fn raw(shape: Shape) -> Self {
        Self {
            shape,
            position: Vector2::zero(),
            rotation: 0.0,
            velocity: Vector2::zero(),
            angular_velocity: 0.0,
            biased_velocity: Vector2::zero(),
            biased_angular_velocity: 0.0,
            force: Vector2::zero(),
            torque: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            original_inv_mass: 0.0,
            original_inv_inertia: 0.0,
            friction: 0.5,
            restitution: 0.0,
            max_velocity: f32::MAX,
            bitmask: 0,
            excluded: Vec::new(),
            user_data: 0,
            flags: BodyFlags::default(),
            touching: Vec::new(),
            old_position: Vector2::zero(),
            old_rotation: 0.0,
        }
    }

    /// Sets the body's mass, deriving rotational inertia from the shape
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inertia = mass * self.shape.surface_factor() / 12.0;

        self.inv_mass = if self.flags.contains(BodyFlags::MOVEABLE) && mass.is_finite() {
            1.0 / mass
        } else {
            0.0
        };
        self.inv_inertia = if self.flags.contains(BodyFlags::ROTATABLE)
            && self.inertia > 0.0
            && self.inertia.is_finite()
        {
            1.0 / self.inertia
        } else {
            0.0
        };

        self.original_inv_mass = self.inv_mass;
        self.original_inv_inertia = self.inv_inertia;
    }

    /// Returns the body's shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replaces the body's shape, recomputing inertia
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        if !self.is_static() {
            self.set_mass(self.mass);
        }
    }

    /// Returns the body's position
    #[inline]
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Sets the body's position
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    /// Returns the body's rotation in radians
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Sets the body's rotation in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    /// Returns the body's linear velocity
    #[inline]
    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Sets the body's linear velocity
    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.velocity = velocity;
    }

    /// Returns the body's angular velocity
    #[inline]
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Sets the body's angular velocity
    pub fn set_angular_velocity(&mut self, velocity: f32) {
        self.angular_velocity = velocity;
    }

    /// Returns the biased (positional correction) velocity
    #[inline]
    pub fn biased_velocity(&self) -> Vector2 {
        self.biased_velocity
    }

    /// Returns the biased (positional correction) angular velocity
    #[inline]
    pub fn biased_angular_velocity(&self) -> f32 {
        self.biased_angular_velocity
    }

    /// Adds to the linear velocity
    #[inline]
    pub fn adjust_velocity(&mut self, delta: Vector2) {
        self.velocity += delta;
    }

    /// Adds to the angular velocity
    #[inline]
    pub fn adjust_angular_velocity(&mut self, delta: f32) {
        self.angular_velocity += delta;
    }

    /// Adds to the biased velocity channel
    #[inline]
    pub fn adjust_biased_velocity(&mut self, delta: Vector2) {
        self.biased_velocity += delta;
    }

    /// Adds to the biased angular velocity channel
    #[inline]
    pub fn adjust_biased_angular_velocity(&mut self, delta: f32) {
        self.biased_angular_velocity += delta;
    }

    /// Returns the accumulated force
    pub fn force(&self) -> Vector2 {
        self.force
    }

    /// Adds a force to the accumulator, applied at the next integration
    pub fn add_force(&mut self, force: Vector2) {
        self.force += force;
    }

    /// Returns the accumulated torque
    pub fn torque(&self) -> f32 {
        self.torque
    }

    /// Adds a torque to the accumulator, applied at the next integration
    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    /// Returns the body's mass
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Returns the body's inverse mass (zero when static or resting)
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Returns the body's rotational inertia
    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    /// Returns the body's inverse inertia (zero when static or resting)
    #[inline]
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Returns the friction coefficient
    #[inline]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Sets the friction coefficient
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction.max(0.0);
    }

    /// Returns the restitution coefficient
    #[inline]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Sets the restitution coefficient
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution.max(0.0);
    }

    /// Sets the maximum velocity magnitude, enforced after integration
    pub fn set_max_velocity(&mut self, max: f32) {
        self.max_velocity = max.max(0.0);
    }

    /// Returns the collision exclusion bitmask
    #[inline]
    pub fn bitmask(&self) -> u64 {
        self.bitmask
    }

    /// Sets the collision exclusion bitmask
    pub fn set_bitmask(&mut self, bitmask: u64) {
        self.bitmask = bitmask;
    }

    /// Adds a body to the exclusion list; the pair will never collide
    pub fn add_excluded_body(&mut self, handle: BodyHandle) {
        if !self.excluded.contains(&handle) {
            self.excluded.push(handle);
        }
    }

    /// Removes a body from the exclusion list
    pub fn remove_excluded_body(&mut self, handle: BodyHandle) {
        self.excluded.retain(|h| *h != handle);
    }

    /// Returns whether the given body is on the exclusion list
    pub fn excludes(&self, handle: BodyHandle) -> bool {
        self.excluded.contains(&handle)
    }

    /// Returns the opaque user tag
    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    /// Sets the opaque user tag
    pub fn set_user_data(&mut self, data: u64) {
        self.user_data = data;
    }

    /// Returns whether the body participates in simulation
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(BodyFlags::ENABLED)
    }

    /// Enables or disables the body
    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(BodyFlags::ENABLED, enabled);
    }

    /// Returns whether the body is static
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(BodyFlags::STATIC)
    }

    /// Returns whether gravity applies to this body
    #[inline]
    pub fn is_gravity_affected(&self) -> bool {
        self.flags.contains(BodyFlags::GRAVITY_AFFECTED)
    }

    /// Sets whether gravity applies to this body
    pub fn set_gravity_affected(&mut self, affected: bool) {
        self.flags.set(BodyFlags::GRAVITY_AFFECTED, affected);
    }

    /// Sets whether the body may translate; clearing zeroes inverse mass
    pub fn set_moveable(&mut self, moveable: bool) {
        self.flags.set(BodyFlags::MOVEABLE, moveable);
        if !self.is_static() {
            self.set_mass(self.mass);
        }
    }

    /// Sets whether the body may rotate; clearing zeroes inverse inertia
    pub fn set_rotatable(&mut self, rotatable: bool) {
        self.flags.set(BodyFlags::ROTATABLE, rotatable);
        if !self.is_static() {
            self.set_mass(self.mass);
        }
    }

    /// Returns whether the body is resting. Static bodies always rest.
    #[inline]
    pub fn is_resting(&self) -> bool {
        self.is_static() || self.flags.contains(BodyFlags::RESTING)
    }

    /// Marks the body as resting: inverse mass and inertia are forced to
    /// zero (masquerading as infinite mass) and velocities are cleared
    pub(crate) fn set_resting(&mut self) {
        if self.is_static() || self.flags.contains(BodyFlags::RESTING) {
            return;
        }

        self.flags.insert(BodyFlags::RESTING);
        self.inv_mass = 0.0;
        self.inv_inertia = 0.0;
        self.velocity = Vector2::zero();
        self.angular_velocity = 0.0;
        self.biased_velocity = Vector2::zero();
        self.biased_angular_velocity = 0.0;
    }

    /// Ends resting, restoring the original inverse mass and inertia
    pub(crate) fn wake(&mut self) {
        if !self.flags.contains(BodyFlags::RESTING) {
            return;
        }

        self.flags.remove(BodyFlags::RESTING);
        self.inv_mass = self.original_inv_mass;
        self.inv_inertia = self.original_inv_inertia;
    }

    /// Snapshots frame-start state and clears touch/hit bookkeeping
    pub(crate) fn start_frame(&mut self) {
        self.old_position = self.position;
        self.old_rotation = self.rotation;
        self.touching.clear();
        self.flags.remove(BodyFlags::HIT_THIS_FRAME);
    }

    /// Records contact with another body during this frame. `hard_hit` is
    /// true when the other body was a moving, non-resting body above the
    /// world's hit-velocity tolerance.
    pub(crate) fn record_touch(&mut self, other: BodyHandle, hard_hit: bool) {
        if !self.touching.contains(&other) {
            self.touching.push(other);
        }
        if hard_hit {
            self.flags.insert(BodyFlags::HIT_THIS_FRAME);
        }
    }

    /// Returns whether the body was struck hard this frame
    pub(crate) fn was_hit_this_frame(&self) -> bool {
        self.flags.contains(BodyFlags::HIT_THIS_FRAME)
    }

    /// Returns the bodies recorded as touching this frame
    pub(crate) fn touching(&self) -> &[BodyHandle] {
        &self.touching
    }

    /// Returns how far the body moved since frame start
    pub(crate) fn movement_since_frame_start(&self) -> f32 {
        self.position.distance(&self.old_position)
    }

    /// Returns how far the body rotated since frame start
    pub(crate) fn rotation_since_frame_start(&self) -> f32 {
        (self.rotation - self.old_rotation).abs()
    }

    /// Integrates accumulated forces (plus gravity) into the velocity and
    /// applies the global damping factor. A damping of 1.0 is lossless.
    pub(crate) fn integrate_forces(&mut self, gravity: Vector2, damping: f32, dt: f32) {
        if self.inv_mass == 0.0 && self.inv_inertia == 0.0 {
            return;
        }

        let mut acceleration = self.force * self.inv_mass;
        if self.is_gravity_affected() && self.inv_mass > 0.0 {
            acceleration += gravity;
        }

        self.velocity += acceleration * dt;
        self.angular_velocity += self.torque * self.inv_inertia * dt;

        if damping != 1.0 {
            self.velocity *= damping;
            self.angular_velocity *= damping;
        }

        if self.max_velocity != f32::MAX {
            self.velocity = self.velocity.clamp_length(self.max_velocity);
        }
    }

    /// Integrates both velocity channels into the pose, then zeroes the
    /// biased channel and the force/torque accumulators
    pub(crate) fn integrate_position(&mut self, dt: f32) {
        self.position += (self.velocity + self.biased_velocity) * dt;
        self.rotation += (self.angular_velocity + self.biased_angular_velocity) * dt;

        self.biased_velocity = Vector2::zero();
        self.biased_angular_velocity = 0.0;
        self.force = Vector2::zero();
        self.torque = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BoxShape, Circle};
    use approx::assert_relative_eq;

    #[test]
    fn test_new_rejects_bad_mass() {
        assert!(Body::new(Circle::new(1.0).into(), 0.0).is_err());
        assert!(Body::new(Circle::new(1.0).into(), -2.0).is_err());
        assert!(Body::new(Circle::new(1.0).into(), f32::NAN).is_err());
    }

    #[test]
    fn test_box_inertia() {
        let body = Body::new(BoxShape::new(2.0, 2.0).into(), 3.0).unwrap();
        // I = m (w^2 + h^2) / 12
        assert_relative_eq!(body.inertia(), 3.0 * 8.0 / 12.0);
    }

    #[test]
    fn test_static_has_zero_inverse_terms() {
        let body = Body::new_static(BoxShape::new(1.0, 1.0).into());
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
        assert!(body.is_resting());
    }

    #[test]
    fn test_resting_freezes_and_wake_restores() {
        let mut body = Body::new(Circle::new(1.0).into(), 2.0).unwrap();
        body.set_velocity(Vector2::new(1.0, 0.0));

        body.set_resting();
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
        assert!(body.velocity().is_zero());

        body.wake();
        assert_relative_eq!(body.inv_mass(), 0.5);
        assert!(!body.is_resting());
    }

    #[test]
    fn test_integrate_forces_applies_gravity_and_damping() {
        let mut body = Body::new(Circle::new(1.0).into(), 1.0).unwrap();
        body.integrate_forces(Vector2::new(0.0, 10.0), 1.0, 0.5);
        assert_relative_eq!(body.velocity().y, 5.0);

        body.integrate_forces(Vector2::zero(), 0.5, 0.5);
        assert_relative_eq!(body.velocity().y, 2.5);
    }

    #[test]
    fn test_biased_channel_zeroed_after_integration() {
        let mut body = Body::new(Circle::new(1.0).into(), 1.0).unwrap();
        body.adjust_biased_velocity(Vector2::new(1.0, 0.0));
        body.integrate_position(1.0);

        assert_relative_eq!(body.position().x, 1.0);
        assert!(body.biased_velocity().is_zero());
    }
}
