//! 3x3 matrix type for color transformations.
//!
//! [`Mat3`] is used for RGB-to-XYZ conversions and for the cone-space
//! matrices of the appearance model.
//!
//! # Convention
//!
//! Matrices are stored in **row-major** order and use **column vectors**:
//!
//! ```text
//! | m00 m01 m02 |   | x |   | m00*x + m01*y + m02*z |
//! | m10 m11 m12 | * | y | = | m10*x + m11*y + m12*z |
//! | m20 m21 m22 |   | z |   | m20*x + m21*y + m22*z |
//! ```

use crate::Vec3;
use std::ops::Mul;

/// A 3x3 matrix for color transformations.
///
/// Stored in row-major order. Use [`Mat3::from_rows`] or [`Mat3::from_cols`]
/// to construct from component arrays.
///
/// # Example
///
/// ```rust
/// use bgx_math::{Mat3, Vec3};
///
/// let identity = Mat3::IDENTITY;
/// let v = Vec3::new(1.0, 2.0, 3.0);
/// assert_eq!(identity * v, v);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    /// Matrix elements in row-major order: [row0, row1, row2]
    pub m: [[f64; 3]; 3],
}

impl Mat3 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from row arrays.
    #[inline]
    pub const fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { m: rows }
    }

    /// Creates a matrix from column arrays.
    ///
    /// Transposes the input (columns become rows internally).
    #[inline]
    pub const fn from_cols(cols: [[f64; 3]; 3]) -> Self {
        Self {
            m: [
                [cols[0][0], cols[1][0], cols[2][0]],
                [cols[0][1], cols[1][1], cols[2][1]],
                [cols[0][2], cols[1][2], cols[2][2]],
            ],
        }
    }

    /// Creates a matrix from Vec3 columns.
    #[inline]
    pub fn from_col_vecs(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self::from_cols([c0.to_array(), c1.to_array(), c2.to_array()])
    }

    /// Creates a diagonal matrix.
    #[inline]
    pub const fn diagonal(d0: f64, d1: f64, d2: f64) -> Self {
        Self::from_rows([
            [d0, 0.0, 0.0],
            [0.0, d1, 0.0],
            [0.0, 0.0, d2],
        ])
    }

    /// Computes the determinant.
    #[inline]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Computes the inverse of this matrix.
    ///
    /// Returns `None` if the matrix is singular or the result is not finite.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bgx_math::Mat3;
    ///
    /// let m = Mat3::diagonal(2.0, 4.0, 8.0);
    /// let inv = m.inverse().unwrap();
    /// assert_eq!(inv, Mat3::diagonal(0.5, 0.25, 0.125));
    /// ```
    pub fn inverse(&self) -> Option<Self> {
        if self.determinant().abs() < 1e-12 {
            return None;
        }
        let inv = Self::from_glam(self.to_glam().inverse());
        inv.is_finite().then_some(inv)
    }

    /// Returns true if all elements are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|x| x.is_finite())
    }

    /// Converts to glam DMat3 (column-major).
    #[inline]
    pub fn to_glam(&self) -> glam::DMat3 {
        // glam uses column-major, so we transpose
        glam::DMat3::from_cols_array_2d(&[
            [self.m[0][0], self.m[1][0], self.m[2][0]],
            [self.m[0][1], self.m[1][1], self.m[2][1]],
            [self.m[0][2], self.m[1][2], self.m[2][2]],
        ])
    }

    /// Creates from glam DMat3.
    #[inline]
    pub fn from_glam(m: glam::DMat3) -> Self {
        Self::from_cols(m.to_cols_array_2d())
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// Mat3 * Vec3
impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }
}

// Mat3 * Mat3
impl Mul for Mat3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m }
    }
}
