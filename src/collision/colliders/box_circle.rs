use crate::bodies::Body;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Vector2, EPSILON};
use crate::shapes::Shape;

// Region tags for the feature id: 0..=3 are faces, 4 marks deep overlap
const REGION_DEEP: u8 = 4;

/// Collides a box (first body) against a circle (second body)
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Box(box_shape), Shape::Circle(circle)) = (body_a.shape(), body_b.shape()) else {
        return Vec::new();
    };

    let half = box_shape.half_extents();
    let radius = circle.radius();

    // Circle center in the box's local frame
    let local = (body_b.position() - body_a.position()).rotated(-body_a.rotation());
    let clamped = Vector2::new(
        local.x.clamp(-half.x, half.x),
        local.y.clamp(-half.y, half.y),
    );

    if (local - clamped).length_squared() > EPSILON * EPSILON {
        // Center outside the box: closest point is on the perimeter
        let closest = body_a.position() + clamped.rotated(body_a.rotation());
        let delta = body_b.position() - closest;
        let distance = delta.length();

        if distance > radius {
            return Vec::new();
        }

        let normal = delta / distance;
        let region = face_region(local, half);
        return vec![Contact::new(
            closest,
            normal,
            distance - radius,
            FeatureId::from_edge(0, region),
        )];
    }

    // Center inside the box: push out along the nearest face
    let depth_x = half.x - local.x.abs();
    let depth_y = half.y - local.y.abs();
    let (local_normal, face_depth) = if depth_x < depth_y {
        (Vector2::new(local.x.signum(), 0.0), depth_x)
    } else {
        (Vector2::new(0.0, local.y.signum()), depth_y)
    };

    let normal = local_normal.rotated(body_a.rotation());
    vec![Contact::new(
        body_b.position(),
        normal,
        -(radius + face_depth),
        FeatureId::from_edge(0, REGION_DEEP),
    )]
}

/// Picks a stable face tag from the local-frame circle center
fn face_region(local: Vector2, half: Vector2) -> u8 {
    let dx = local.x.abs() - half.x;
    let dy = local.y.abs() - half.y;
    if dx > dy {
        if local.x > 0.0 {
            0
        } else {
            1
        }
    } else if local.y > 0.0 {
        2
    } else {
        3
    }
}
