//! Exact intersection gathering between two convex contours.
//!
//! Candidate edge pairs from the sweep are tested for segment intersection;
//! each crossing is classified as ingoing (the first contour entering the
//! second) or outgoing, sorted along the first contour, and paired up into
//! penetration lobes.

use crate::math::{Vector2, EPSILON};
use crate::shapes::contains_point;

/// Hard cap on gathered intersections per pair of contours
pub const MAX_INTERSECTIONS: usize = 50;

/// Crossings closer than this are merged away as duplicates
const MIN_PAIR_DISTANCE: f32 = 0.005;

/// A single crossing between an edge of the first contour and an edge of
/// the second
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    /// Edge index on the first contour
    pub edge_a: usize,

    /// Edge index on the second contour
    pub edge_b: usize,

    /// Crossing position in world space
    pub position: Vector2,

    /// True when the first contour is entering the second here
    pub ingoing: bool,

    /// Arc position along the first contour (edge index plus fraction),
    /// used for ordering
    pub along: f32,
}

/// Tests candidate edge pairs and returns the actual crossings, capped at
/// [`MAX_INTERSECTIONS`]
pub fn gather(
    vertices_a: &[Vector2],
    vertices_b: &[Vector2],
    candidates: &[(usize, usize)],
) -> Vec<Intersection> {
    let mut intersections = Vec::new();

    for &(edge_a, edge_b) in candidates {
        if intersections.len() >= MAX_INTERSECTIONS {
            break;
        }

        let a0 = vertices_a[edge_a];
        let a1 = vertices_a[(edge_a + 1) % vertices_a.len()];
        let b0 = vertices_b[edge_b];
        let b1 = vertices_b[(edge_b + 1) % vertices_b.len()];

        let dir_a = a1 - a0;
        let dir_b = b1 - b0;
        let denominator = dir_a.cross(&dir_b);
        if denominator.abs() < EPSILON {
            // Parallel edges never produce a transversal crossing
            continue;
        }

        let offset = b0 - a0;
        let t = offset.cross(&dir_b) / denominator;
        let u = offset.cross(&dir_a) / denominator;
        if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
            continue;
        }

        // With both contours counter-clockwise, the first contour enters
        // the second when its edge heads into the half-plane left of the
        // second's edge
        intersections.push(Intersection {
            edge_a,
            edge_b,
            position: a0 + dir_a * t,
            ingoing: dir_b.cross(&dir_a) > 0.0,
            along: edge_a as f32 + t,
        });
    }

    intersections
}

/// Orders the crossings along the first contour and pairs every ingoing
/// crossing with the following outgoing one.
///
/// Pairs closer together than the minimum distance are discarded as noise.
/// When more than one lobe survives, the contours are fully interlocked;
/// only the most significant lobe is kept (see [`select_lobe`]).
pub fn pair_crossings(
    mut intersections: Vec<Intersection>,
    vertices_a: &[Vector2],
    vertices_b: &[Vector2],
) -> Vec<(Intersection, Intersection)> {
    intersections.sort_unstable_by(|a, b| a.along.total_cmp(&b.along));

    let ingoing_count = intersections.iter().filter(|i| i.ingoing).count();
    if ingoing_count == 0 || ingoing_count == intersections.len() {
        // Grazing or fully-contained contours produce no usable lobes
        return Vec::new();
    }

    // Rotate so the sequence starts on an ingoing crossing
    let first_ingoing = intersections
        .iter()
        .position(|i| i.ingoing)
        .unwrap_or_default();
    intersections.rotate_left(first_ingoing);

    let mut pairs = Vec::new();
    let mut i = 0;
    while i < intersections.len() {
        let ingoing = intersections[i];
        if ingoing.ingoing {
            if let Some(outgoing) = intersections[i + 1..].iter().find(|x| !x.ingoing) {
                pairs.push((ingoing, *outgoing));
            }
        }
        i += 1;
    }

    pairs.retain(|(ingoing, outgoing)| {
        ingoing.position.distance_squared(&outgoing.position)
            >= MIN_PAIR_DISTANCE * MIN_PAIR_DISTANCE
    });

    if pairs.len() > 1 {
        let keep = select_lobe(&pairs, vertices_a, vertices_b);
        pairs = vec![pairs[keep]];
    }

    pairs
}

/// Full-interpenetration heuristic: for each lobe, count the run of second-
/// contour vertices following its outgoing crossing that lie outside the
/// first contour; the lobe following the longest run is the real one
fn select_lobe(
    pairs: &[(Intersection, Intersection)],
    vertices_a: &[Vector2],
    vertices_b: &[Vector2],
) -> usize {
    let count_b = vertices_b.len();
    let mut best = 0;
    let mut best_run = None;

    for (index, (_, outgoing)) in pairs.iter().enumerate() {
        let mut run = 0;
        for step in 1..=count_b {
            let vertex = vertices_b[(outgoing.edge_b + step) % count_b];
            if contains_point(vertices_a, vertex) {
                break;
            }
            run += 1;
        }

        if best_run.map_or(true, |b| run > b) {
            best_run = Some(run);
            best = (index + 1) % pairs.len();
        }
    }

    best
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

    fn all_pairs(a: &[Vector2], b: &[Vector2]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for ea in 0..a.len() {
            for eb in 0..b.len() {
                pairs.push((ea, eb));
            }
        }
        pairs
    }

    #[test]
    fn test_offset_squares_cross_twice() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.5, 0.3, 1.0);

        let crossings = gather(&a, &b, &all_pairs(&a, &b));
        assert_eq!(crossings.len(), 2);
        assert_eq!(crossings.iter().filter(|i| i.ingoing).count(), 1);
    }

    #[test]
    fn test_crossings_pair_into_one_lobe() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.5, 0.3, 1.0);

        let crossings = gather(&a, &b, &all_pairs(&a, &b));
        let pairs = pair_crossings(crossings, &a, &b);

        assert_eq!(pairs.len(), 1);
        let (ingoing, outgoing) = &pairs[0];
        assert!(ingoing.ingoing);
        assert!(!outgoing.ingoing);
    }

    #[test]
    fn test_contained_contour_yields_nothing() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(0.0, 0.0, 0.5);

        let crossings = gather(&a, &b, &all_pairs(&a, &b));
        assert!(pair_crossings(crossings, &a, &b).is_empty());
    }

    #[test]
    fn test_cross_shape_keeps_single_lobe() {
        // A tall thin box fully spanning a wide flat box: two lobes poke
        // out, only one survives the heuristic
        let a = vec![
            Vector2::new(-0.2, -2.0),
            Vector2::new(0.2, -2.0),
            Vector2::new(0.2, 2.0),
            Vector2::new(-0.2, 2.0),
        ];
        let b = vec![
            Vector2::new(-2.0, -0.5),
            Vector2::new(2.0, -0.5),
            Vector2::new(2.0, 0.5),
            Vector2::new(-2.0, 0.5),
        ];

        let crossings = gather(&a, &b, &all_pairs(&a, &b));
        assert_eq!(crossings.len(), 4);

        let pairs = pair_crossings(crossings, &a, &b);
        assert_eq!(pairs.len(), 1);
    }
}
