use crate::bodies::Body;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Vector2, EPSILON};
use crate::shapes::{contains_point, Shape};

/// Collides a convex polygon (first body) against a circle (second body)
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Polygon(polygon), Shape::Circle(circle)) = (body_a.shape(), body_b.shape())
    else {
        return Vec::new();
    };

    let vertices = polygon.world_vertices(body_a.position(), body_a.rotation());
    if vertices.len() < 3 {
        return Vec::new();
    }

    let center = body_b.position();
    let radius = circle.radius();

    // Closest point over all edges
    let mut best_distance_squared = f32::MAX;
    let mut best_point = Vector2::zero();
    let mut best_edge = 0;
    for (i, window) in edge_iter(&vertices).enumerate() {
        let point = closest_point_on_segment(window.0, window.1, center);
        let d2 = point.distance_squared(&center);
        if d2 < best_distance_squared {
            best_distance_squared = d2;
            best_point = point;
            best_edge = i;
        }
    }

    let distance = best_distance_squared.sqrt();
    let inside = contains_point(&vertices, center);

    if !inside && distance > radius {
        return Vec::new();
    }

    let (normal, separation) = if inside {
        // Push the circle out through the nearest edge
        let (a, b) = edge(&vertices, best_edge);
        let outward = -(b - a).normalize().perpendicular();
        (outward, -(radius + distance))
    } else if distance > EPSILON {
        ((center - best_point) / distance, distance - radius)
    } else {
        let (a, b) = edge(&vertices, best_edge);
        (-(b - a).normalize().perpendicular(), -radius)
    };

    vec![Contact::new(
        best_point,
        normal,
        separation,
        FeatureId::from_edge(best_edge, 0),
    )]
}

fn edge(vertices: &[Vector2], i: usize) -> (Vector2, Vector2) {
    (vertices[i], vertices[(i + 1) % vertices.len()])
}

fn edge_iter(vertices: &[Vector2]) -> impl Iterator<Item = (Vector2, Vector2)> + '_ {
    (0..vertices.len()).map(move |i| edge(vertices, i))
}

fn closest_point_on_segment(start: Vector2, end: Vector2, point: Vector2) -> Vector2 {
    let axis = end - start;
    let length_squared = axis.length_squared();
    if length_squared < EPSILON * EPSILON {
        return start;
    }

    let t = ((point - start).dot(&axis) / length_squared).clamp(0.0, 1.0);
    start + axis * t
}
