//! Polygon-polygon collision through the contour pipeline: edge sweep,
//! intersection gathering, lobe pairing, penetration sweep.

use crate::bodies::Body;
use crate::collision::colliders::edge_sweep::{Contour, EdgeSweep};
use crate::collision::colliders::intersection::{gather, pair_crossings};
use crate::collision::colliders::penetration_sweep;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Vector2, EPSILON};
use crate::shapes::Shape;

/// Collides two convex polygons
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Polygon(poly_a), Shape::Polygon(poly_b)) = (body_a.shape(), body_b.shape())
    else {
        return Vec::new();
    };

    let vertices_a = poly_a.world_vertices(body_a.position(), body_a.rotation());
    let vertices_b = poly_b.world_vertices(body_b.position(), body_b.rotation());
    collide_contours(&vertices_a, &vertices_b, body_a.position(), body_b.position())
}

/// Collides two counter-clockwise world-space contours.
///
/// Shared by every collider that can express its shapes as contours (the
/// polygon, line, and mixed box pairings).
pub fn collide_contours(
    vertices_a: &[Vector2],
    vertices_b: &[Vector2],
    position_a: Vector2,
    position_b: Vector2,
) -> Vec<Contact> {
    if vertices_a.len() < 3 || vertices_b.len() < 3 {
        return Vec::new();
    }

    // Sweep along the line between the bodies; any direction works, this
    // one keeps the projection intervals tight
    let mut direction = position_b - position_a;
    if direction.length_squared() < EPSILON * EPSILON {
        direction = Vector2::unit_x();
    }

    let mut sweep = EdgeSweep::new(direction.normalize());
    sweep.add_vertices(vertices_a, Contour::First);
    sweep.add_vertices(vertices_b, Contour::Second);
    let candidates = sweep.overlapping_edges(vertices_a.len(), vertices_b.len());
    if candidates.is_empty() {
        return Vec::new();
    }

    let crossings = gather(vertices_a, vertices_b, &candidates);
    let lobes = pair_crossings(crossings, vertices_a, vertices_b);

    let mut contacts = Vec::with_capacity(lobes.len() * 2);
    for (ingoing, outgoing) in &lobes {
        let Some(penetration) = penetration_sweep::sweep(ingoing, outgoing, vertices_a, vertices_b)
        else {
            continue;
        };

        // Both contacts share the lobe's depth; halved twice so each of the
        // two points corrects only its share of the overlap
        let separation = -penetration.depth * 0.25;

        contacts.push(Contact::new(
            ingoing.position,
            penetration.normal,
            separation,
            FeatureId::from_intersection(
                ingoing.edge_a,
                ingoing.edge_b,
                outgoing.edge_a,
                outgoing.edge_b,
                false,
            ),
        ));
        contacts.push(Contact::new(
            outgoing.position,
            penetration.normal,
            separation,
            FeatureId::from_intersection(
                ingoing.edge_a,
                ingoing.edge_b,
                outgoing.edge_a,
                outgoing.edge_b,
                true,
            ),
        ));
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ConvexPolygon;

    fn polygon_body(x: f32, y: f32, vertices: Vec<Vector2>) -> Body {
        let mut body = Body::new(ConvexPolygon::new(vertices).into(), 1.0).unwrap();
        body.set_position(Vector2::new(x, y));
        body
    }

    fn square_vertices(half: f32) -> Vec<Vector2> {
        vec![
            Vector2::new(-half, -half),
            Vector2::new(half, -half),
            Vector2::new(half, half),
            Vector2::new(-half, half),
        ]
    }

    #[test]
    fn test_overlapping_squares_produce_two_contacts() {
        let a = polygon_body(0.0, 0.0, square_vertices(1.0));
        let b = polygon_body(1.6, 0.3, square_vertices(1.0));

        let contacts = collide(&a, &b);
        assert_eq!(contacts.len(), 2);

        for c in &contacts {
            assert!(c.separation < 0.0);
            assert!(c.normal.x > 0.9);
        }
        assert_ne!(contacts[0].feature, contacts[1].feature);
    }

    #[test]
    fn test_separated_squares_produce_nothing() {
        let a = polygon_body(0.0, 0.0, square_vertices(1.0));
        let b = polygon_body(5.0, 0.0, square_vertices(1.0));
        assert!(collide(&a, &b).is_empty());
    }

    #[test]
    fn test_features_stable_across_small_motion() {
        let a = polygon_body(0.0, 0.0, square_vertices(1.0));
        let b1 = polygon_body(1.6, 0.30, square_vertices(1.0));
        let b2 = polygon_body(1.6, 0.32, square_vertices(1.0));

        let first: Vec<_> = collide(&a, &b1).iter().map(|c| c.feature).collect();
        let second: Vec<_> = collide(&a, &b2).iter().map(|c| c.feature).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_triangle_poking_square() {
        let triangle = vec![
            Vector2::new(-0.5, -0.5),
            Vector2::new(0.5, -0.5),
            Vector2::new(0.0, 0.5),
        ];
        let a = polygon_body(0.0, 1.2, triangle);
        let b = polygon_body(0.0, 0.0, square_vertices(1.0));

        // Triangle apex points down into the square's top face
        let contacts = collide(&a, &b);
        assert_eq!(contacts.len(), 2);
        for c in &contacts {
            assert!(c.normal.y < -0.5);
            assert!(c.separation < 0.0);
        }
    }
}
