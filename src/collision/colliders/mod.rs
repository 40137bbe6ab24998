//! Narrow-phase colliders, one module per shape pairing.
//!
//! Every collider takes the two bodies with the first body's shape matching
//! the module name's first shape, and returns contact points whose normals
//! point away from the first body. Reversed pairings are handled by the
//! dispatch layer, which swaps the bodies and negates the normals.

pub mod box_box;
pub mod box_circle;
pub mod circle_circle;
pub mod edge_sweep;
pub mod intersection;
pub mod line_circle;
pub mod line_poly;
pub mod penetration_sweep;
pub mod poly_circle;
pub mod poly_poly;
