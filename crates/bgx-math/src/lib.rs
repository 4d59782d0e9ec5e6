//! # bgx-math
//!
//! Math utilities for viewing-condition color translation.
//!
//! This crate provides the numeric primitives shared by the color pipeline:
//!
//! - [`Mat3`] - 3x3 matrices for RGB/XYZ and cone-space transforms
//! - [`Vec3`] - 3D vectors for RGB, XYZ and cone-response triplets
//! - Cone response matrices used by CIECAM02 ([`CAT02`], [`HPE`])
//! - Sign-preserving power ([`spow`]) for values that may go negative
//!
//! # Design
//!
//! All values are `f64`. The appearance model is differentiated by finite
//! differences and round-trips are checked at 1e-6, which single precision
//! cannot hold.
//!
//! Matrices are stored **row-major** and act on **column vectors**:
//!
//! ```text
//! result = matrix * vector
//! ```
//!
//! # Usage
//!
//! ```rust
//! use bgx_math::{Mat3, Vec3};
//!
//! let rgb_to_xyz = Mat3::from_rows([
//!     [0.4124564, 0.3575761, 0.1804375],
//!     [0.2126729, 0.7151522, 0.0721750],
//!     [0.0193339, 0.1191920, 0.9503041],
//! ]);
//!
//! let rgb = Vec3::new(1.0, 0.5, 0.25);
//! let xyz = rgb_to_xyz * rgb;
//! ```
//!
//! # Dependencies
//!
//! - [`glam`] - double precision matrix inversion
//!
//! # Used By
//!
//! - `bgx-primaries` - RGB/XYZ matrix derivation
//! - `bgx-color` - appearance model and gamut mapping

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod mat3;
mod vec3;
mod adapt;

pub use mat3::*;
pub use vec3::*;
pub use adapt::*;

/// Sign-preserving power: `sign(x) * |x|^exp`.
///
/// Plain `powf` on a negative base with a fractional exponent is NaN. Values
/// dip below zero after matrix round-off near black, and out-of-gamut
/// intermediates can be far negative, so every fractional power applied to
/// color data goes through this function.
///
/// ```rust
/// use bgx_math::spow;
///
/// assert_eq!(spow(-4.0, 0.5), -2.0);
/// assert_eq!(spow(0.0, 2.2), 0.0);
/// ```
#[inline]
pub fn spow(x: f64, exp: f64) -> f64 {
    x.abs().powf(exp).copysign(x)
}
