use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::joints::{BasicJoint, Joint};
use crate::math::Vector2;
use crate::Result;

/// Welds two bodies together.
///
/// Two point constraints at distinct anchors pin both the relative position
/// and the relative rotation of the pair.
pub struct FixedJoint {
    primary: BasicJoint,
    secondary: BasicJoint,
}

impl FixedJoint {
    /// Welds the bodies using their current poses: one constraint at each
    /// body's origin as seen by the other
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        bodies: &BodyStorage<Body>,
    ) -> Result<Self> {
        let a = bodies.get_body(body_a)?;
        let b = bodies.get_body(body_b)?;

        Ok(Self {
            primary: BasicJoint::at_world_point(body_a, body_b, a.position(), bodies)?,
            secondary: BasicJoint::at_world_point(body_a, body_b, b.position(), bodies)?,
        })
    }

    /// Welds the bodies with explicit local anchors for both constraints
    pub fn with_anchors(
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchors_a: (Vector2, Vector2),
        anchors_b: (Vector2, Vector2),
    ) -> Self {
        Self {
            primary: BasicJoint::new(body_a, body_b, anchors_a.0, anchors_b.0),
            secondary: BasicJoint::new(body_a, body_b, anchors_a.1, anchors_b.1),
        }
    }
}

impl Joint for FixedJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        self.primary.bodies()
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        self.primary.pre_step(bodies, inv_dt)?;
        self.secondary.pre_step(bodies, inv_dt)
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        self.primary.apply_impulse(bodies)?;
        self.secondary.apply_impulse(bodies)
    }
}
