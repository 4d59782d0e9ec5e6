//! 3D vector type for color triplets.
//!
//! [`Vec3`] represents RGB, XYZ, cone responses or other 3-component values.
//!
//! # Usage
//!
//! ```rust
//! use bgx_math::Vec3;
//!
//! let rgb = Vec3::new(1.0, 0.5, 0.25);
//! let scaled = rgb * 2.0;
//! let clamped = scaled.clamp01();
//! ```

use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

/// A 3D vector for color triplets (RGB, XYZ, etc.).
///
/// # Components
///
/// Access via `.x`, `.y`, `.z` or index `[0]`, `[1]`, `[2]`.
/// For RGB: x=R, y=G, z=B. For XYZ: x=X, y=Y, z=Z.
///
/// # Example
///
/// ```rust
/// use bgx_math::Vec3;
///
/// let color = Vec3::new(0.5, 0.5, 0.5);
/// assert_eq!(color.x, 0.5);
/// assert_eq!(color[0], 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Vec3 {
    /// X component (R for RGB, X for XYZ)
    pub x: f64,
    /// Y component (G for RGB, Y for XYZ)
    pub y: f64,
    /// Z component (B for RGB, Z for XYZ)
    pub z: f64,
}

impl Vec3 {
    /// Zero vector (0, 0, 0).
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// One vector (1, 1, 1).
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Creates a new vector.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a vector with all components set to the same value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bgx_math::Vec3;
    ///
    /// let gray = Vec3::splat(0.5);
    /// assert_eq!(gray, Vec3::new(0.5, 0.5, 0.5));
    /// ```
    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Converts to an array.
    #[inline]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length (avoids sqrt).
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Clamps each component to [0, 1].
    #[inline]
    pub fn clamp01(self) -> Self {
        self.min(Self::ONE).max(Self::ZERO)
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Applies `f` to every component.
    #[inline]
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    /// Returns the smallest component.
    #[inline]
    pub fn min_element(self) -> f64 {
        self.x.min(self.y).min(self.z)
    }

    /// Returns the largest component.
    #[inline]
    pub fn max_element(self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    /// Arithmetic mean of the components.
    #[inline]
    pub fn mean(self) -> f64 {
        (self.x + self.y + self.z) / 3.0
    }

    /// Returns true if every component lies in [0, 1].
    #[inline]
    pub fn in_unit_cube(self) -> bool {
        self.min_element() >= 0.0 && self.max_element() <= 1.0
    }

    /// Returns true if all components are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Indexing
impl Index<usize> for Vec3 {
    type Output = f64;

    #[inline]
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {}", i),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 index out of bounds: {}", i),
        }
    }
}

// Vec3 + Vec3
impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

// Vec3 - Vec3
impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// -Vec3
impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// Vec3 * Vec3 (component-wise)
impl Mul for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

// Vec3 * f64
impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// f64 * Vec3
impl Mul<Vec3> for f64 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self * rhs.x, self * rhs.y, self * rhs.z)
    }
}

// Vec3 / Vec3 (component-wise)
impl Div for Vec3 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

// Vec3 / f64
impl Div<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_splat() {
        assert_eq!(Vec3::splat(0.5), Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a.dot(b), 32.0);
    }

    #[test]
    fn test_vec3_clamp01() {
        let c = Vec3::new(-0.5, 0.5, 1.5).clamp01();
        assert_eq!(c, Vec3::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_vec3_unit_cube() {
        assert!(Vec3::new(0.0, 0.5, 1.0).in_unit_cube());
        assert!(!Vec3::new(-1e-12, 0.5, 1.0).in_unit_cube());
        assert!(!Vec3::new(0.0, 0.5, 1.0 + 1e-12).in_unit_cube());
    }

    #[test]
    fn test_vec3_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a.map(|v| v * v), Vec3::new(1.0, 4.0, 9.0));
        assert_eq!(a.mean(), 2.0);
    }

    #[test]
    fn test_vec3_index() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v[1] = 7.0;
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], 7.0);
        assert_eq!(v[2], 3.0);
    }
}
