//! Joint constraints between pairs of bodies.
//!
//! Joints run inside the same sequential-impulse loop as the contact
//! arbiters: [`Joint::pre_step`] once per step to build effective masses
//! and bias terms, then [`Joint::apply_impulse`] once per iteration.

mod angle;
mod basic;
mod constraining;
mod distance;
mod fixed;
mod slide;
mod spring;

pub use angle::{AngleJoint, FixedAngleJoint, SpringyAngleJoint};
pub use basic::BasicJoint;
pub use constraining::ConstrainingJoint;
pub use distance::DistanceJoint;
pub use fixed::FixedJoint;
pub use slide::SlideJoint;
pub use spring::SpringJoint;

use crate::bodies::Body;
use crate::core::storage::BodyStorage;
use crate::core::BodyHandle;
use crate::Result;

/// A velocity constraint between two bodies.
///
/// `pre_step` may fail when the constraint configuration is degenerate
/// (for example a singular effective-mass matrix); the world treats that
/// as a fatal stepping error.
pub trait Joint {
    /// The two bodies the joint connects
    fn bodies(&self) -> (BodyHandle, BodyHandle);

    /// Prepares the solver state for this step and applies warm starting
    fn pre_step(&mut self, bodies: &mut BodyStorage<Body>, inv_dt: f32) -> Result<()>;

    /// Applies one iteration's impulse
    fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()>;

    /// Returns whether the joint involves the given body
    fn involves(&self, handle: BodyHandle) -> bool {
        let (a, b) = self.bodies();
        a == handle || b == handle
    }
}
