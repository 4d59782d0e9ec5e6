//! # bgx-primaries
//!
//! Color primaries, white points, and RGB-XYZ matrix derivation.
//!
//! The encoding colorspace of the translation pipeline is defined by the
//! chromaticities of its three primaries and its white point. The matrices
//! between linear RGB and CIE XYZ are *derived* from those chromaticities
//! rather than copied from a table, so they are exact for whatever primary
//! set is chosen.
//!
//! # Usage
//!
//! ```rust
//! use bgx_primaries::{SRGB, rgb_to_xyz_matrix};
//! use bgx_math::Vec3;
//!
//! let matrix = rgb_to_xyz_matrix(&SRGB).unwrap();
//!
//! // White (1, 1, 1) lands on the white point with Y = 1
//! let white = matrix * Vec3::ONE;
//! assert!((white.y - 1.0).abs() < 1e-12);
//! ```
//!
//! # Dependencies
//!
//! - [`bgx-math`] - Matrix operations
//!
//! # Used By
//!
//! - `bgx-color` - encoding transform

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use bgx_math::{Mat3, Vec3};

/// RGB color space primaries definition.
///
/// Defines a color space by its three primary colors (R, G, B) and white point,
/// all specified as CIE xy chromaticity coordinates.
///
/// # Example
///
/// ```rust
/// use bgx_primaries::Primaries;
///
/// let my_space = Primaries {
///     r: (0.64, 0.33),
///     g: (0.30, 0.60),
///     b: (0.15, 0.06),
///     w: (0.3127, 0.3290),
///     name: "Custom",
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primaries {
    /// Red primary (x, y) chromaticity
    pub r: (f64, f64),
    /// Green primary (x, y) chromaticity
    pub g: (f64, f64),
    /// Blue primary (x, y) chromaticity
    pub b: (f64, f64),
    /// White point (x, y) chromaticity
    pub w: (f64, f64),
    /// Color space name
    pub name: &'static str,
}

impl Primaries {
    /// White point as XYZ (Y=1).
    #[inline]
    pub fn white_xyz(&self) -> Vec3 {
        xy_to_xyz(self.w.0, self.w.1)
    }
}

/// D65 white point chromaticity (daylight, ~6500K).
pub const D65_XY: (f64, f64) = (0.31270, 0.32900);

/// sRGB / Rec.709 primaries (D65 white point).
///
/// The encoding colorspace of the web. Paired with a pure 2.2 gamma rather
/// than the piecewise sRGB curve, which is how most displays behave.
pub const SRGB: Primaries = Primaries {
    r: (0.6400, 0.3300),
    g: (0.3000, 0.6000),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "sRGB",
};

/// Converts xy chromaticity to XYZ (with Y=1).
fn xy_to_xyz(x: f64, y: f64) -> Vec3 {
    if y.abs() < 1e-10 {
        Vec3::ZERO
    } else {
        Vec3::new(x / y, 1.0, (1.0 - x - y) / y)
    }
}

/// Computes the RGB to XYZ matrix for a set of primaries.
///
/// # Algorithm
///
/// 1. Convert xy chromaticities to XYZ (with Y=1)
/// 2. Compute scaling factors so white point maps correctly
/// 3. Multiply primaries by scaling factors
///
/// Returns `None` when the primaries are collinear and no matrix exists.
pub fn rgb_to_xyz_matrix(primaries: &Primaries) -> Option<Mat3> {
    let r_xyz = xy_to_xyz(primaries.r.0, primaries.r.1);
    let g_xyz = xy_to_xyz(primaries.g.0, primaries.g.1);
    let b_xyz = xy_to_xyz(primaries.b.0, primaries.b.1);
    let w_xyz = primaries.white_xyz();

    let m = Mat3::from_col_vecs(r_xyz, g_xyz, b_xyz);

    // Solve for scaling factors: M * S = W
    let s = m.inverse()? * w_xyz;

    Some(Mat3::from_col_vecs(r_xyz * s.x, g_xyz * s.y, b_xyz * s.z))
}

/// Computes the XYZ to RGB matrix for a set of primaries.
///
/// This is the inverse of [`rgb_to_xyz_matrix`].
pub fn xyz_to_rgb_matrix(primaries: &Primaries) -> Option<Mat3> {
    rgb_to_xyz_matrix(primaries)?.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_matrix() {
        let m = rgb_to_xyz_matrix(&SRGB).unwrap();

        // Published IEC 61966-2-1 values, rounded to 7 digits
        assert!((m.m[0][0] - 0.4124564).abs() < 1e-4);
        assert!((m.m[1][0] - 0.2126729).abs() < 1e-4);
        assert!((m.m[2][2] - 0.9503041).abs() < 1e-4);
    }

    #[test]
    fn test_white_point() {
        let m = rgb_to_xyz_matrix(&SRGB).unwrap();
        let white = m * Vec3::ONE;
        let expected = SRGB.white_xyz();

        for i in 0..3 {
            assert!((white[i] - expected[i]).abs() < 1e-12, "white[{}] = {}", i, white[i]);
        }
    }

    #[test]
    fn test_roundtrip() {
        let to_xyz = rgb_to_xyz_matrix(&SRGB).unwrap();
        let to_rgb = xyz_to_rgb_matrix(&SRGB).unwrap();

        let rgb = Vec3::new(0.5, 0.3, 0.8);
        let back = to_rgb * (to_xyz * rgb);

        for i in 0..3 {
            assert!((rgb[i] - back[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_collinear_primaries_have_no_matrix() {
        let degenerate = Primaries {
            r: (0.2, 0.2),
            g: (0.3, 0.3),
            b: (0.4, 0.4),
            w: D65_XY,
            name: "degenerate",
        };
        assert!(rgb_to_xyz_matrix(&degenerate).is_none());
    }
}
