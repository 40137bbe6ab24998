mod circle;
mod box_shape;
mod line;
mod polygon;

pub use box_shape::BoxShape;
pub use circle::Circle;
pub use line::Line;
pub use polygon::{contains_point, ConvexPolygon};

use crate::math::{Aabb, Vector2};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Tag identifying the concrete kind of a shape, used for collider dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Box,
    Line,
    Polygon,
}

/// The geometry attached to a body.
///
/// Shapes form a closed set; collider dispatch is a lookup over pairs of
/// [`ShapeKind`] tags rather than a trait-object hierarchy.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Shape {
    Circle(Circle),
    Box(BoxShape),
    Line(Line),
    Polygon(ConvexPolygon),
}

impl Shape {
    /// Returns the kind tag for this shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Box(_) => ShapeKind::Box,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Returns a rotation-invariant bounding box in local space
    pub fn bounds(&self) -> Aabb {
        match self {
            Shape::Circle(c) => c.bounds(),
            Shape::Box(b) => b.bounds(),
            Shape::Line(l) => l.bounds(),
            Shape::Polygon(p) => p.bounds(),
        }
    }

    /// Returns the world-space bounding box for a body at the given position.
    ///
    /// The local bounds are rotation invariant, so only translation applies.
    pub fn world_bounds(&self, position: Vector2) -> Aabb {
        self.bounds().translate(position)
    }

    /// Returns the scalar feeding rotational inertia: `I = mass * factor / 12`
    pub fn surface_factor(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.surface_factor(),
            Shape::Box(b) => b.surface_factor(),
            Shape::Line(l) => l.surface_factor(),
            Shape::Polygon(p) => p.surface_factor(),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<BoxShape> for Shape {
    fn from(b: BoxShape) -> Self {
        Shape::Box(b)
    }
}

impl From<Line> for Shape {
    fn from(l: Line) -> Self {
        Shape::Line(l)
    }
}

impl From<ConvexPolygon> for Shape {
    fn from(p: ConvexPolygon) -> Self {
        Shape::Polygon(p)
    }
}
