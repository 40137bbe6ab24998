use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A 2x2 matrix used for rotations and joint effective-mass computation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix2 {
    /// Row-major storage: m[row][column]
    pub m: [[f32; 2]; 2],
}

impl Matrix2 {
    /// Creates a new matrix from the individual entries (row major)
    #[inline]
    pub fn new(m00: f32, m01: f32, m10: f32, m11: f32) -> Self {
        Self {
            m: [[m00, m01], [m10, m11]],
        }
    }

    /// Creates the identity matrix
    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    /// Creates the zero matrix
    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Creates a rotation matrix for the given angle (radians)
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, -sin, sin, cos)
    }

    /// Returns the determinant of the matrix
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }

    /// Returns the inverse of the matrix, or `None` if it is singular.
    ///
    /// A singular effective-mass matrix indicates a physically degenerate
    /// constraint configuration and is treated as fatal by the joints.
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < crate::math::EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        Some(Self::new(
            self.m[1][1] * inv_det,
            -self.m[0][1] * inv_det,
            -self.m[1][0] * inv_det,
            self.m[0][0] * inv_det,
        ))
    }

    /// Multiplies the matrix by a vector
    #[inline]
    pub fn multiply_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y,
            self.m[1][0] * v.x + self.m[1][1] * v.y,
        )
    }

    /// Multiplies the matrix by another matrix
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut out = Self::zero();
        for row in 0..2 {
            for col in 0..2 {
                out.m[row][col] =
                    self.m[row][0] * other.m[0][col] + self.m[row][1] * other.m[1][col];
            }
        }
        out
    }

    /// Returns the transpose of the matrix
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::new(self.m[0][0], self.m[1][0], self.m[0][1], self.m[1][1])
    }
}
