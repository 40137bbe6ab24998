use crate::bodies::Body;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Vector2, EPSILON};
use crate::shapes::Shape;

// Region tags for the feature id: 0 is the segment interior, 1 and 2 the caps
const REGION_INTERIOR: u8 = 0;
const REGION_START_CAP: u8 = 1;
const REGION_END_CAP: u8 = 2;

/// Collides a line segment (first body) against a circle (second body)
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Line(line), Shape::Circle(circle)) = (body_a.shape(), body_b.shape()) else {
        return Vec::new();
    };

    let [start, end] = line.world_points(body_a.position(), body_a.rotation());
    let center = body_b.position();
    let radius = circle.radius();

    let (closest, region) = closest_point_on_segment(start, end, center);
    let delta = center - closest;
    let distance = delta.length();

    if distance > radius {
        return Vec::new();
    }

    // A center exactly on the segment gives no usable normal; fall back to
    // the segment's perpendicular
    let normal = if distance > EPSILON {
        delta / distance
    } else {
        (end - start).normalize().perpendicular()
    };

    vec![Contact::new(
        closest,
        normal,
        distance - radius,
        FeatureId::from_edge(0, region),
    )]
}

/// Returns the closest point on the segment plus the region it fell in
fn closest_point_on_segment(start: Vector2, end: Vector2, point: Vector2) -> (Vector2, u8) {
    let axis = end - start;
    let length_squared = axis.length_squared();
    if length_squared < EPSILON * EPSILON {
        return (start, REGION_START_CAP);
    }

    let t = (point - start).dot(&axis) / length_squared;
    if t <= 0.0 {
        (start, REGION_START_CAP)
    } else if t >= 1.0 {
        (end, REGION_END_CAP)
    } else {
        (start + axis * t, REGION_INTERIOR)
    }
}
