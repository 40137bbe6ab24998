//! Penetration depth estimation for a lobe between two crossings.
//!
//! The two contour sections connecting the ingoing and outgoing crossing
//! are walked in lockstep, projected onto the axis between the crossings,
//! and the maximum gap perpendicular to that axis is the depth.

use crate::collision::colliders::intersection::Intersection;
use crate::math::{lerp, Vector2, EPSILON};

/// The result of sweeping a penetration lobe
#[derive(Debug, Clone, Copy)]
pub struct Penetration {
    /// Maximum gap between the two contour sections
    pub depth: f32,

    /// Collision normal, perpendicular to the crossing axis and pointing
    /// away from the first contour's interior
    pub normal: Vector2,
}

/// Measures how deeply the first contour's lobe pokes through the second.
///
/// The first contour's section runs forward (in winding order) from the
/// ingoing to the outgoing crossing; the second contour's section connects
/// the same crossings walked against its winding.
pub fn sweep(
    ingoing: &Intersection,
    outgoing: &Intersection,
    vertices_a: &[Vector2],
    vertices_b: &[Vector2],
) -> Option<Penetration> {
    let axis = outgoing.position - ingoing.position;
    if axis.length_squared() < EPSILON * EPSILON {
        return None;
    }
    let axis = axis.normalize();

    // Orient the normal away from the first contour's interior: the lobe
    // pokes out on the opposite side of the centroid
    let mut normal = axis.perpendicular();
    let centroid_a = average(vertices_a);
    if (centroid_a - ingoing.position).dot(&normal) > 0.0 {
        normal = -normal;
    }

    let chain_a = chain_forward(ingoing, outgoing, vertices_a);
    let chain_b = chain_backward(ingoing, outgoing, vertices_b);

    // Evaluate the gap at every breakpoint of either chain
    let mut stations: Vec<f32> = chain_a
        .iter()
        .chain(chain_b.iter())
        .map(|p| p.dot(&axis))
        .collect();
    let start = ingoing.position.dot(&axis);
    let end = outgoing.position.dot(&axis);
    stations.retain(|s| *s >= start - EPSILON && *s <= end + EPSILON);

    let mut depth = 0.0_f32;
    for station in stations {
        let height_a = profile(&chain_a, axis, normal, station, f32::max);
        let height_b = profile(&chain_b, axis, normal, station, f32::min);
        if let (Some(a), Some(b)) = (height_a, height_b) {
            depth = depth.max(a - b);
        }
    }

    Some(Penetration { depth, normal })
}

/// Vertices of the first contour from the ingoing to the outgoing crossing,
/// walking with the winding
fn chain_forward(
    ingoing: &Intersection,
    outgoing: &Intersection,
    vertices: &[Vector2],
) -> Vec<Vector2> {
    let count = vertices.len();
    let mut chain = vec![ingoing.position];

    let mut edge = ingoing.edge_a;
    while edge != outgoing.edge_a {
        edge = (edge + 1) % count;
        chain.push(vertices[edge]);
    }

    chain.push(outgoing.position);
    chain
}

/// Vertices of the second contour from the ingoing to the outgoing crossing,
/// walking against the winding
fn chain_backward(
    ingoing: &Intersection,
    outgoing: &Intersection,
    vertices: &[Vector2],
) -> Vec<Vector2> {
    let count = vertices.len();
    let mut chain = vec![ingoing.position];

    let mut edge = ingoing.edge_b;
    while edge != outgoing.edge_b {
        chain.push(vertices[edge]);
        edge = (edge + count - 1) % count;
    }

    chain.push(outgoing.position);
    chain
}

/// Height of the chain above the axis at the given station. Chains are not
/// strictly monotone along the axis, so segments are folded with the given
/// combinator when more than one covers the station.
fn profile(
    chain: &[Vector2],
    axis: Vector2,
    normal: Vector2,
    station: f32,
    fold: fn(f32, f32) -> f32,
) -> Option<f32> {
    let mut result: Option<f32> = None;

    for window in chain.windows(2) {
        let s0 = window[0].dot(&axis);
        let s1 = window[1].dot(&axis);
        let (low, high) = if s0 <= s1 { (s0, s1) } else { (s1, s0) };
        if station < low - EPSILON || station > high + EPSILON {
            continue;
        }

        let h0 = window[0].dot(&normal);
        let h1 = window[1].dot(&normal);
        let height = if (s1 - s0).abs() < EPSILON {
            fold(h0, h1)
        } else {
            lerp(h0, h1, (station - s0) / (s1 - s0))
        };

        result = Some(match result {
            Some(r) => fold(r, height),
            None => height,
        });
    }

    result
}

fn average(vertices: &[Vector2]) -> Vector2 {
    let mut sum = Vector2::zero();
    for v in vertices {
        sum += *v;
    }
    sum / (vertices.len().max(1) as f32)
}
