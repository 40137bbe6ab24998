//! Line-polygon collision.
//!
//! A convex polygon crossing a line segment is handled like a one-lobe
//! contour pairing: the two crossing points become the contacts, and the
//! depth is how far the polygon's vertices poke through to the far side
//! of the line.

use crate::bodies::Body;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Vector2, EPSILON};
use crate::shapes::{contains_point, Shape};

// Edge tags for synthesized crossings at the segment's end caps
const EDGE_TAG_START: usize = 100;
const EDGE_TAG_END: usize = 101;

#[derive(Clone, Copy)]
struct Crossing {
    t: f32,
    edge: usize,
    position: Vector2,
}

/// Collides a line segment (first body) against a convex polygon
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Line(line), Shape::Polygon(polygon)) = (body_a.shape(), body_b.shape()) else {
        return Vec::new();
    };

    let [start, end] = line.world_points(body_a.position(), body_a.rotation());
    let vertices = polygon.world_vertices(body_b.position(), body_b.rotation());
    collide_line_contour(start, end, &vertices)
}

/// Collides a world-space segment against a counter-clockwise contour
pub fn collide_line_contour(start: Vector2, end: Vector2, vertices: &[Vector2]) -> Vec<Contact> {
    if vertices.len() < 3 {
        return Vec::new();
    }

    let direction = end - start;
    if direction.length_squared() < EPSILON * EPSILON {
        return Vec::new();
    }

    let mut crossings = gather_crossings(start, direction, vertices);

    // End caps inside the polygon count as crossings too, so a polygon
    // swallowing an endpoint still resolves
    if crossings.len() < 2 {
        if contains_point(vertices, start) {
            crossings.push(Crossing {
                t: 0.0,
                edge: EDGE_TAG_START,
                position: start,
            });
        }
        if contains_point(vertices, end) {
            crossings.push(Crossing {
                t: 1.0,
                edge: EDGE_TAG_END,
                position: end,
            });
        }
    }
    if crossings.len() < 2 {
        return Vec::new();
    }

    crossings.sort_unstable_by(|a, b| a.t.total_cmp(&b.t));
    let first = crossings[0];
    let last = crossings[crossings.len() - 1];

    // Normal perpendicular to the segment, away from the polygon's bulk;
    // that is the direction the polygon must be pushed back out
    let axis = direction.normalize();
    let mut normal = axis.perpendicular();
    let centroid = average(vertices);
    if (centroid - start).dot(&normal) < 0.0 {
        normal = -normal;
    }

    // Depth: the farthest any polygon vertex has passed through the line
    let mut depth = 0.0_f32;
    for vertex in vertices {
        depth = depth.max(-(*vertex - start).dot(&normal));
    }

    let separation = -depth * 0.25;
    vec![
        Contact::new(
            first.position,
            normal,
            separation,
            FeatureId::from_intersection(0, first.edge, 0, last.edge, false),
        ),
        Contact::new(
            last.position,
            normal,
            separation,
            FeatureId::from_intersection(0, first.edge, 0, last.edge, true),
        ),
    ]
}

fn gather_crossings(start: Vector2, direction: Vector2, vertices: &[Vector2]) -> Vec<Crossing> {
    let mut crossings = Vec::new();
    let count = vertices.len();

    for edge in 0..count {
        let b0 = vertices[edge];
        let b1 = vertices[(edge + 1) % count];
        let edge_direction = b1 - b0;

        let denominator = direction.cross(&edge_direction);
        if denominator.abs() < EPSILON {
            continue;
        }

        let offset = b0 - start;
        let t = offset.cross(&edge_direction) / denominator;
        let u = offset.cross(&direction) / denominator;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            crossings.push(Crossing {
                t,
                edge,
                position: start + direction * t,
            });
        }
    }

    crossings
}

fn average(vertices: &[Vector2]) -> Vector2 {
    let mut sum = Vector2::zero();
    for v in vertices {
        sum += *v;
    }
    sum / (vertices.len().max(1) as f32)
}
