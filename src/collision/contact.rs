use crate::math::Vector2;

/// Identifies which surface features of the two shapes generated a contact.
///
/// Contacts carry their accumulated impulses from one step to the next; the
/// feature id is the matching key, so it must be stable while the same pair
/// of features stays in contact. The packing scheme is opaque to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureId(u32);

impl FeatureId {
    /// Feature id for shapes that can only produce a single contact
    pub const NONE: FeatureId = FeatureId(0);

    /// Packs four clip-edge numbers, as produced by box-box clipping
    pub(crate) fn from_edges(in_1: u8, out_1: u8, in_2: u8, out_2: u8) -> Self {
        FeatureId(
            (in_1 as u32) | (out_1 as u32) << 8 | (in_2 as u32) << 16 | (out_2 as u32) << 24,
        )
    }

    /// Packs the edge indices of an intersection pair between two contours.
    ///
    /// `which` distinguishes the two contacts produced by the same pair.
    pub(crate) fn from_intersection(
        in_a: usize,
        in_b: usize,
        out_a: usize,
        out_b: usize,
        which: bool,
    ) -> Self {
        let pack = |e: usize| (e as u32) & 0x7f;
        FeatureId(
            pack(in_a)
                | pack(in_b) << 7
                | pack(out_a) << 14
                | pack(out_b) << 21
                | (which as u32) << 28
                | 1 << 29,
        )
    }

    /// Packs a single edge index plus a small region tag (end caps, faces)
    pub(crate) fn from_edge(edge: usize, region: u8) -> Self {
        FeatureId(((edge as u32) & 0xffff) | (region as u32) << 16 | 1 << 30)
    }
}

/// A single contact point between two bodies.
///
/// The normal points away from the first body of the pair. Separation is
/// negative while the shapes overlap. The accumulated impulses persist
/// across steps for warm starting; the remaining fields are recomputed by
/// the arbiter every pre-step.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Contact position in world space
    pub position: Vector2,

    /// Contact normal, pointing away from the first body
    pub normal: Vector2,

    /// Signed separation along the normal (negative = penetrating)
    pub separation: f32,

    /// Identity of the generating surface features, for warm starting
    pub feature: FeatureId,

    /// Accumulated normal impulse
    pub accumulated_normal_impulse: f32,

    /// Accumulated tangent (friction) impulse
    pub accumulated_tangent_impulse: f32,

    /// Accumulated impulse on the position-correction channel
    pub accumulated_bias_impulse: f32,

    /// Effective mass along the normal
    pub mass_normal: f32,

    /// Effective mass along the tangent
    pub mass_tangent: f32,

    /// Position-correction target velocity
    pub bias: f32,

    /// Restitution target velocity
    pub restitution_bias: f32,
}

impl Contact {
    /// Creates a fresh contact with zeroed impulses
    pub fn new(position: Vector2, normal: Vector2, separation: f32, feature: FeatureId) -> Self {
        Self {
            position,
            normal,
            separation,
            feature,
            accumulated_normal_impulse: 0.0,
            accumulated_tangent_impulse: 0.0,
            accumulated_bias_impulse: 0.0,
            mass_normal: 0.0,
            mass_tangent: 0.0,
            bias: 0.0,
            restitution_bias: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_features_are_distinct() {
        let a = FeatureId::from_edges(1, 2, 3, 4);
        let b = FeatureId::from_edges(1, 2, 4, 3);
        assert_ne!(a, b);
        assert_ne!(a, FeatureId::NONE);
    }

    #[test]
    fn test_intersection_features_distinguish_contacts() {
        let first = FeatureId::from_intersection(0, 1, 2, 3, false);
        let second = FeatureId::from_intersection(0, 1, 2, 3, true);
        assert_ne!(first, second);
    }

    #[test]
    fn test_feature_kinds_do_not_collide() {
        // The same raw numbers packed by different colliders must not alias
        let edges = FeatureId::from_edges(1, 0, 0, 0);
        let single = FeatureId::from_edge(1, 0);
        assert_ne!(edges, single);
    }

    #[test]
    fn test_new_contact_has_zero_impulses() {
        let c = Contact::new(Vector2::zero(), Vector2::unit_y(), -0.1, FeatureId::NONE);
        assert_eq!(c.accumulated_normal_impulse, 0.0);
        assert_eq!(c.accumulated_tangent_impulse, 0.0);
        assert_eq!(c.accumulated_bias_impulse, 0.0);
    }
}
