//! Web-encoded RGB <-> linear RGB <-> CIE XYZ.
//!
//! The encoding is sRGB primaries with a pure, mirrored 2.2 gamma. Both
//! matrices are derived from the primaries once, when the [`Encoding`] is
//! built, and reused for every conversion.

use bgx_math::{Mat3, Vec3};
use bgx_primaries::{Primaries, SRGB, rgb_to_xyz_matrix};
use bgx_transfer::gamma;

use crate::{ColorError, ColorResult};

/// Encoding colorspace with its derived RGB/XYZ matrices.
///
/// # Example
///
/// ```rust
/// use bgx_color::Encoding;
/// use bgx_color::math::Vec3;
///
/// let enc = Encoding::srgb().unwrap();
/// let xyz = enc.rgb_to_xyz(enc.decode(Vec3::new(0.2, 0.7, 0.9)));
/// let back = enc.encode(enc.xyz_to_rgb(xyz));
/// assert!((back.y - 0.7).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoding {
    primaries: Primaries,
    rgb_to_xyz: Mat3,
    xyz_to_rgb: Mat3,
}

impl Encoding {
    /// Builds the encoding for a set of primaries.
    ///
    /// Fails with [`ColorError::MatrixError`] if the primaries are degenerate.
    pub fn new(primaries: Primaries) -> ColorResult<Self> {
        let rgb_to_xyz = rgb_to_xyz_matrix(&primaries).ok_or_else(|| {
            ColorError::MatrixError(format!("{} primaries are collinear", primaries.name))
        })?;
        let xyz_to_rgb = rgb_to_xyz.inverse().ok_or_else(|| {
            ColorError::MatrixError(format!("{} RGB to XYZ matrix is singular", primaries.name))
        })?;
        Ok(Self { primaries, rgb_to_xyz, xyz_to_rgb })
    }

    /// sRGB primaries, D65 white, gamma 2.2.
    pub fn srgb() -> ColorResult<Self> {
        Self::new(SRGB)
    }

    /// Primaries this encoding was derived from.
    #[inline]
    pub fn primaries(&self) -> &Primaries {
        &self.primaries
    }

    /// Linear RGB -> XYZ matrix (Y of white = 1).
    #[inline]
    pub fn rgb_to_xyz_matrix(&self) -> Mat3 {
        self.rgb_to_xyz
    }

    /// XYZ -> linear RGB matrix.
    #[inline]
    pub fn xyz_to_rgb_matrix(&self) -> Mat3 {
        self.xyz_to_rgb
    }

    /// Encoded RGB -> linear RGB (mirrored gamma 2.2).
    #[inline]
    pub fn decode(&self, rgb: Vec3) -> Vec3 {
        gamma::decode_rgb(rgb)
    }

    /// Linear RGB -> encoded RGB (mirrored gamma 1/2.2).
    #[inline]
    pub fn encode(&self, linear: Vec3) -> Vec3 {
        gamma::encode_rgb(linear)
    }

    /// Linear RGB -> relative XYZ.
    #[inline]
    pub fn rgb_to_xyz(&self, linear: Vec3) -> Vec3 {
        self.rgb_to_xyz * linear
    }

    /// Relative XYZ -> linear RGB.
    #[inline]
    pub fn xyz_to_rgb(&self, xyz: Vec3) -> Vec3 {
        self.xyz_to_rgb * xyz
    }

    /// Relative XYZ of the reference white (Y = 1).
    #[inline]
    pub fn white_xyz(&self) -> Vec3 {
        self.rgb_to_xyz * Vec3::ONE
    }
}
