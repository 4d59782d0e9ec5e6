//! Mirrored gamma transfer functions.
//!
//! `decode(v) = sign(v) * |v|^gamma`, `encode(l) = sign(l) * |l|^(1/gamma)`.
//!
//! # Range
//!
//! - Input/Output: all finite reals; [0, 1] maps onto [0, 1]

use bgx_math::{spow, Vec3};

/// Display gamma assumed for web-encoded RGB.
pub const WEB_GAMMA: f64 = 2.2;

/// Mirrored EOTF for arbitrary gamma: `sign(v) * |v|^gamma`
///
/// # Example
///
/// ```rust
/// use bgx_transfer::gamma::gamma_eotf;
///
/// let linear = gamma_eotf(0.5, 2.2);
/// assert!((linear - 0.2176).abs() < 1e-4);
/// ```
#[inline]
pub fn gamma_eotf(v: f64, gamma: f64) -> f64 {
    spow(v, gamma)
}

/// Mirrored OETF for arbitrary gamma: `sign(l) * |l|^(1/gamma)`
///
/// # Example
///
/// ```rust
/// use bgx_transfer::gamma::gamma_oetf;
///
/// let encoded = gamma_oetf(0.218, 2.2);
/// assert!((encoded - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn gamma_oetf(l: f64, gamma: f64) -> f64 {
    spow(l, 1.0 / gamma)
}

/// Web gamma 2.2 decode of a single component.
#[inline]
pub fn decode(v: f64) -> f64 {
    gamma_eotf(v, WEB_GAMMA)
}

/// Web gamma 2.2 encode of a single component.
#[inline]
pub fn encode(l: f64) -> f64 {
    gamma_oetf(l, WEB_GAMMA)
}

/// Decodes an encoded RGB triplet to linear light.
#[inline]
pub fn decode_rgb(rgb: Vec3) -> Vec3 {
    rgb.map(decode)
}

/// Encodes a linear RGB triplet.
#[inline]
pub fn encode_rgb(linear: Vec3) -> Vec3 {
    linear.map(encode)
}
