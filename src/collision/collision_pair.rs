use crate::core::BodyHandle;

/// An unordered pair of potentially-colliding bodies, stored in canonical
/// order so that the same two bodies always produce an equal pair.
///
/// The canonical order puts the non-static body with the lower handle first;
/// a static body always ends up second. Contact normals generated for the
/// pair point away from the first body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    body_a: BodyHandle,
    body_b: BodyHandle,
}

impl CollisionPair {
    /// Builds the canonical pair for two bodies
    pub fn new(a: BodyHandle, b: BodyHandle, a_static: bool, b_static: bool) -> Self {
        if a_static && !b_static {
            Self {
                body_a: b,
                body_b: a,
            }
        } else if b_static && !a_static {
            Self {
                body_a: a,
                body_b: b,
            }
        } else if a <= b {
            Self {
                body_a: a,
                body_b: b,
            }
        } else {
            Self {
                body_a: b,
                body_b: a,
            }
        }
    }

    /// The first body of the pair
    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    /// The second body of the pair
    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }

    /// Returns whether the pair involves the given body
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u32) -> BodyHandle {
        BodyHandle(id)
    }

    #[test]
    fn test_dynamic_pair_orders_by_handle() {
        let pair = CollisionPair::new(handle(7), handle(3), false, false);
        assert_eq!(pair.body_a(), handle(3));
        assert_eq!(pair.body_b(), handle(7));
    }

    #[test]
    fn test_static_body_is_always_second() {
        let pair = CollisionPair::new(handle(1), handle(9), true, false);
        assert_eq!(pair.body_a(), handle(9));
        assert_eq!(pair.body_b(), handle(1));
    }

    #[test]
    fn test_same_bodies_same_pair() {
        let forward = CollisionPair::new(handle(2), handle(5), false, true);
        let reversed = CollisionPair::new(handle(5), handle(2), true, false);
        assert_eq!(forward, reversed);
    }
}
