//! Sweep-line pruning of polygon edge pairs.
//!
//! Both contours' vertices are projected onto a sweep direction and visited
//! in projection order while per-polygon active edge sets are maintained.
//! Only edges whose projection intervals overlap become candidates for the
//! exact segment intersection test.

use crate::math::Vector2;

/// Identifies which of the two contours a sweep point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contour {
    First,
    Second,
}

#[derive(Debug, Clone, Copy)]
struct SweepPoint {
    contour: Contour,
    vertex: usize,
    projection: f32,
}

/// Collects projected vertices in sorted order and reports edge pairs whose
/// sweep intervals overlap
pub struct EdgeSweep {
    direction: Vector2,
    points: Vec<SweepPoint>,
}

impl EdgeSweep {
    /// Creates a sweep along the given direction
    pub fn new(direction: Vector2) -> Self {
        Self {
            direction,
            points: Vec::new(),
        }
    }

    /// Projects and inserts every vertex of a contour.
    ///
    /// Insertion walks back from the tail; contour vertices arrive in nearly
    /// sorted order, so this stays close to linear in practice.
    pub fn add_vertices(&mut self, vertices: &[Vector2], contour: Contour) {
        for (vertex, v) in vertices.iter().enumerate() {
            let point = SweepPoint {
                contour,
                vertex,
                projection: v.dot(&self.direction),
            };

            let mut i = self.points.len();
            while i > 0 && self.points[i - 1].projection > point.projection {
                i -= 1;
            }
            self.points.insert(i, point);
        }
    }

    /// Returns the edge pairs whose projection intervals overlap.
    ///
    /// Edge `i` of a contour runs from vertex `i` to vertex `i + 1`; each
    /// vertex event toggles its two incident edges in or out of the active
    /// set. An edge entering the active set pairs with every currently
    /// active edge of the other contour.
    pub fn overlapping_edges(&self, count_a: usize, count_b: usize) -> Vec<(usize, usize)> {
        if count_a < 2 || count_b < 2 {
            return Vec::new();
        }

        let mut active_a = vec![false; count_a];
        let mut active_b = vec![false; count_b];
        let mut pairs = Vec::new();

        for point in &self.points {
            let (active, other, count) = match point.contour {
                Contour::First => (&mut active_a, &active_b, count_a),
                Contour::Second => (&mut active_b, &active_a, count_b),
            };

            let incident = [(point.vertex + count - 1) % count, point.vertex];
            for edge in incident {
                if active[edge] {
                    active[edge] = false;
                } else {
                    active[edge] = true;
                    for (other_edge, other_active) in other.iter().enumerate() {
                        if *other_active {
                            pairs.push(match point.contour {
                                Contour::First => (edge, other_edge),
                                Contour::Second => (other_edge, edge),
                            });
                        }
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, half: f32) -> Vec<Vector2> {
        vec![
            Vector2::new(x - half, y - half),
            Vector2::new(x + half, y - half),
            Vector2::new(x + half, y + half),
            Vector2::new(x - half, y + half),
        ]
    }

    #[test]
    fn test_overlapping_squares_yield_candidates() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.5, 0.3, 1.0);

        let mut sweep = EdgeSweep::new(Vector2::unit_x());
        sweep.add_vertices(&a, Contour::First);
        sweep.add_vertices(&b, Contour::Second);

        let pairs = sweep.overlapping_edges(a.len(), b.len());
        // The contours cross where A's right edge meets B's bottom edge and
        // where A's top edge meets B's left edge
        assert!(pairs.contains(&(1, 0)));
        assert!(pairs.contains(&(2, 3)));
    }

    #[test]
    fn test_candidates_are_superset_of_crossings() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 1.0, 1.0);

        let mut sweep = EdgeSweep::new(Vector2::new(1.0, 1.0).normalize());
        sweep.add_vertices(&a, Contour::First);
        sweep.add_vertices(&b, Contour::Second);

        let pairs = sweep.overlapping_edges(a.len(), b.len());
        // The contours cross on A's right and top edges
        assert!(pairs.iter().any(|&(ea, _)| ea == 1));
        assert!(pairs.iter().any(|&(ea, _)| ea == 2));
    }

    #[test]
    fn test_disjoint_intervals_yield_nothing() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 0.0, 1.0);

        let mut sweep = EdgeSweep::new(Vector2::unit_x());
        sweep.add_vertices(&a, Contour::First);
        sweep.add_vertices(&b, Contour::Second);

        assert!(sweep.overlapping_edges(a.len(), b.len()).is_empty());
    }
}
