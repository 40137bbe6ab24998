use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::joints::{BasicJoint, Joint};
use crate::math::Vector2;
use crate::Result;

/// A point constraint that engages only past a slack distance.
///
/// While the anchor points stay within the slack the bodies move freely;
/// beyond it the wrapped point constraint pulls them back. Useful for loose
/// tethers that should not fight small motion.
pub struct ConstrainingJoint {
    inner: BasicJoint,
    slack: f32,
    active: bool,
}

impl ConstrainingJoint {
    /// Creates a tether between the given local anchors with the given slack
    pub fn new(
        body_a: BodyHandle,
        body_b: BodyHandle,
        local_anchor_a: Vector2,
        local_anchor_b: Vector2,
        slack: f32,
    ) -> Self {
        Self {
            inner: BasicJoint::new(body_a, body_b, local_anchor_a, local_anchor_b),
            slack: slack.max(0.0),
            active: false,
        }
    }

    /// Returns whether the tether is currently taut
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Joint for ConstrainingJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        self.inner.bodies()
    }

    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()> {
        let separation = self.inner.anchor_separation(bodies)?;
        let now_active = separation > self.slack;

        if !now_active {
            // Going slack drops the accumulated impulse, so re-engaging
            // does not warm start from a stale pull
            if self.active {
                self.inner.reset_accumulated_impulse();
            }
            self.active = false;
            return Ok(());
        }

        self.active = true;
        self.inner.pre_step(bodies, inv_dt)
    }

    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.inner.apply_impulse(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::Storage;
    use crate::shapes::Circle;

    fn tethered(distance: f32) -> (BodyStorage<Body>, ConstrainingJoint, BodyHandle) {
        let mut bodies: BodyStorage<Body> = BodyStorage::new();
        let anchor = bodies.add(Body::new_static(Circle::new(0.1).into()));

        let mut roaming = Body::new(Circle::new(0.5).into(), 1.0).unwrap();
        roaming.set_position(Vector2::new(distance, 0.0));
        roaming.set_velocity(Vector2::new(1.0, 0.0));
        let roaming_handle = bodies.add(roaming);

        let joint = ConstrainingJoint::new(
            anchor,
            roaming_handle,
            Vector2::zero(),
            Vector2::zero(),
            2.0,
        );
        (bodies, joint, roaming_handle)
    }

    #[test]
    fn test_slack_tether_is_free() {
        let (mut bodies, mut joint, body) = tethered(1.0);

        joint.pre_step(&mut bodies, 60.0).unwrap();
        joint.apply_impulse(&mut bodies).unwrap();

        assert!(!joint.is_active());
        assert_eq!(bodies.get(body).unwrap().velocity(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_taut_tether_pulls_back() {
        let (mut bodies, mut joint, body) = tethered(3.0);

        joint.pre_step(&mut bodies, 60.0).unwrap();
        for _ in 0..10 {
            joint.apply_impulse(&mut bodies).unwrap();
        }

        assert!(joint.is_active());
        assert!(bodies.get(body).unwrap().velocity().x < 1.0);
    }
}
