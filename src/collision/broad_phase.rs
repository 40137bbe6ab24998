use crate::core::BodyHandle;
use crate::math::Aabb;

/// Strategy for producing candidate collision pairs from body bounds.
///
/// The world feeds the strategy every body's world-space bounding box each
/// step and asks for the pairs worth handing to the narrow phase. Exact
/// filtering (masks, exclusion lists, infinite-mass pairs) happens in the
/// world, not here.
pub trait BroadPhaseStrategy {
    /// Replaces the tracked set of bodies and their bounds
    fn update(&mut self, bounds: &[(BodyHandle, Aabb)]);

    /// Returns candidate pairs whose bounds currently overlap
    fn candidate_pairs(&self) -> Vec<(BodyHandle, BodyHandle)>;

    /// Returns the name of this strategy, for diagnostics
    fn strategy_name(&self) -> &'static str;
}

/// The default strategy: tests every pair of bounding boxes.
///
/// O(n^2), entirely adequate for the body counts this engine targets.
#[derive(Debug, Default)]
pub struct BruteForce {
    bounds: Vec<(BodyHandle, Aabb)>,
}

impl BruteForce {
    /// Creates a new brute-force strategy
    pub fn new() -> Self {
        Self::default()
    }
}

impl BroadPhaseStrategy for BruteForce {
    fn update(&mut self, bounds: &[(BodyHandle, Aabb)]) {
        self.bounds.clear();
        self.bounds.extend_from_slice(bounds);
    }

    fn candidate_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut pairs = Vec::new();
        for (i, (handle_a, aabb_a)) in self.bounds.iter().enumerate() {
            for (handle_b, aabb_b) in &self.bounds[i + 1..] {
                if aabb_a.intersects(aabb_b) {
                    pairs.push((*handle_a, *handle_b));
                }
            }
        }
        pairs
    }

    fn strategy_name(&self) -> &'static str {
        "BruteForce"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector2;

    fn bounds(id: u32, min: (f32, f32), max: (f32, f32)) -> (BodyHandle, Aabb) {
        (
            BodyHandle(id),
            Aabb::new(Vector2::new(min.0, min.1), Vector2::new(max.0, max.1)),
        )
    }

    #[test]
    fn test_overlapping_boxes_produce_pair() {
        let mut strategy = BruteForce::new();
        strategy.update(&[
            bounds(1, (0.0, 0.0), (2.0, 2.0)),
            bounds(2, (1.0, 1.0), (3.0, 3.0)),
            bounds(3, (10.0, 10.0), (11.0, 11.0)),
        ]);

        let pairs = strategy.candidate_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0], (BodyHandle(1), BodyHandle(2)));
    }

    #[test]
    fn test_separated_boxes_produce_nothing() {
        let mut strategy = BruteForce::new();
        strategy.update(&[
            bounds(1, (0.0, 0.0), (1.0, 1.0)),
            bounds(2, (5.0, 5.0), (6.0, 6.0)),
        ]);
        assert!(strategy.candidate_pairs().is_empty());
    }
}
