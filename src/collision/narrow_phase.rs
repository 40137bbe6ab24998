//! Narrow-phase dispatch over pairs of shape kinds.
//!
//! Shapes form a closed set, so the dispatch is a single match. Pairings
//! listed in reverse order reuse the forward collider with the bodies
//! swapped and the normals negated. Box shapes pair with polygons and
//! lines by lowering the box to its four-vertex contour.

use log::warn;

use crate::bodies::Body;
use crate::collision::colliders::{
    box_box, box_circle, circle_circle, line_circle, line_poly, poly_circle, poly_poly,
};
use crate::collision::contact::Contact;
use crate::shapes::{Shape, ShapeKind};

/// Runs the collider for the bodies' shape pair.
///
/// Returns `None` for shape pairings with no collider; the caller treats
/// that as zero contacts.
pub fn collide(body_a: &Body, body_b: &Body) -> Option<Vec<Contact>> {
    use ShapeKind::*;

    let kinds = (body_a.shape().kind(), body_b.shape().kind());
    let contacts = match kinds {
        (Circle, Circle) => circle_circle::collide(body_a, body_b),
        (Box, Box) => box_box::collide(body_a, body_b),
        (Box, Circle) => box_circle::collide(body_a, body_b),
        (Circle, Box) => flipped(box_circle::collide, body_a, body_b),
        (Line, Circle) => line_circle::collide(body_a, body_b),
        (Circle, Line) => flipped(line_circle::collide, body_a, body_b),
        (Polygon, Circle) => poly_circle::collide(body_a, body_b),
        (Circle, Polygon) => flipped(poly_circle::collide, body_a, body_b),
        (Polygon, Polygon) => poly_poly::collide(body_a, body_b),
        (Polygon, Box) => poly_box(body_a, body_b),
        (Box, Polygon) => flipped(poly_box, body_a, body_b),
        (Line, Polygon) => line_poly::collide(body_a, body_b),
        (Polygon, Line) => flipped(line_poly::collide, body_a, body_b),
        (Line, Box) => line_box(body_a, body_b),
        (Box, Line) => flipped(line_box, body_a, body_b),
        (Line, Line) => {
            warn!("no collider for shape pair {:?}, ignoring", kinds);
            return None;
        }
    };

    Some(contacts)
}

/// Runs a collider with the bodies swapped, then reorients the normals so
/// they still point away from the original first body
fn flipped(
    collider: fn(&Body, &Body) -> Vec<Contact>,
    body_a: &Body,
    body_b: &Body,
) -> Vec<Contact> {
    let mut contacts = collider(body_b, body_a);
    for contact in &mut contacts {
        contact.normal = -contact.normal;
    }
    contacts
}

/// Polygon versus box, with the box lowered to its corner contour
fn poly_box(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Polygon(polygon), Shape::Box(box_shape)) = (body_a.shape(), body_b.shape())
    else {
        return Vec::new();
    };

    let vertices_a = polygon.world_vertices(body_a.position(), body_a.rotation());
    let vertices_b = box_shape.points(body_b.position(), body_b.rotation());
    poly_poly::collide_contours(
        &vertices_a,
        &vertices_b,
        body_a.position(),
        body_b.position(),
    )
}

/// Line versus box, with the box lowered to its corner contour
fn line_box(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Line(line), Shape::Box(box_shape)) = (body_a.shape(), body_b.shape()) else {
        return Vec::new();
    };

    let [start, end] = line.world_points(body_a.position(), body_a.rotation());
    let vertices = box_shape.points(body_b.position(), body_b.rotation());
    line_poly::collide_line_contour(start, end, &vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector2;
    use crate::shapes::{BoxShape, Circle, Line};

    fn body_at(shape: Shape, x: f32, y: f32) -> Body {
        let mut body = Body::new(shape, 1.0).unwrap();
        body.set_position(Vector2::new(x, y));
        body
    }

    #[test]
    fn test_reversed_pair_negates_normal() {
        let box_body = body_at(BoxShape::new(2.0, 2.0).into(), 0.0, 0.0);
        let circle_body = body_at(Circle::new(0.75).into(), 1.5, 0.0);

        let forward = collide(&box_body, &circle_body).unwrap();
        let reversed = collide(&circle_body, &box_body).unwrap();

        assert_eq!(forward.len(), 1);
        assert_eq!(reversed.len(), 1);
        assert_eq!(forward[0].normal, -reversed[0].normal);
        assert_eq!(forward[0].separation, reversed[0].separation);
    }

    #[test]
    fn test_line_line_is_unsupported() {
        let a = Body::new_static(Line::new(Vector2::zero(), Vector2::new(1.0, 0.0)).into());
        let b = Body::new_static(Line::new(Vector2::zero(), Vector2::new(0.0, 1.0)).into());
        assert!(collide(&a, &b).is_none());
    }

    #[test]
    fn test_box_against_box_contour_parity() {
        // Box-line routing goes through the contour pipeline
        let line = Body::new_static(Line::new(Vector2::new(-5.0, 0.0), Vector2::new(5.0, 0.0)).into());
        let falling = body_at(BoxShape::new(2.0, 2.0).into(), 0.0, 0.8);

        let contacts = collide(&line, &falling).unwrap();
        assert_eq!(contacts.len(), 2);
        for c in &contacts {
            assert!(c.normal.y > 0.9);
            assert!(c.separation < 0.0);
        }
    }
}
