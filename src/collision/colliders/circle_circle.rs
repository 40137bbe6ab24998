use crate::bodies::Body;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Vector2, EPSILON};
use crate::shapes::Shape;

/// Collides two circles, producing at most one contact
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Circle(circle_a), Shape::Circle(circle_b)) = (body_a.shape(), body_b.shape())
    else {
        return Vec::new();
    };

    let delta = body_b.position() - body_a.position();
    let distance = delta.length();
    let total_radius = circle_a.radius() + circle_b.radius();

    if distance > total_radius {
        return Vec::new();
    }

    // Coincident centers have no meaningful normal; pick an arbitrary one
    let normal = if distance > EPSILON {
        delta / distance
    } else {
        Vector2::unit_x()
    };

    let position = body_a.position() + normal * circle_a.radius();
    let separation = distance - total_radius;

    vec![Contact::new(position, normal, separation, FeatureId::NONE)]
}
