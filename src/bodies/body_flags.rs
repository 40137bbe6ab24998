use bitflags::bitflags;

bitflags! {
    /// Per-body state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BodyFlags: u32 {
        /// The body participates in collision detection and solving
        const ENABLED            = 1 << 0;

        /// The body has infinite mass and never moves
        const STATIC             = 1 << 1;

        /// The body is classified as momentarily at rest; its inverse mass
        /// and inertia are forced to zero until it is disturbed
        const RESTING            = 1 << 2;

        /// Gravity is applied during force integration
        const GRAVITY_AFFECTED   = 1 << 3;

        /// The body may translate; clearing this zeroes inverse mass
        const MOVEABLE           = 1 << 4;

        /// The body may rotate; clearing this zeroes inverse inertia
        const ROTATABLE          = 1 << 5;

        /// Set while the body was struck during the current frame
        const HIT_THIS_FRAME     = 1 << 6;
    }
}

impl Default for BodyFlags {
    fn default() -> Self {
        BodyFlags::ENABLED | BodyFlags::GRAVITY_AFFECTED | BodyFlags::MOVEABLE | BodyFlags::ROTATABLE
    }
}
