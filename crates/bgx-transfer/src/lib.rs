//! # bgx-transfer
//!
//! Transfer functions between web-encoded RGB and linear light.
//!
//! # Terminology
//!
//! - **decode** (EOTF): Encoded -> Linear
//! - **encode** (OETF): Linear -> Encoded
//!
//! # Supported Transfer Functions
//!
//! | Function | Use Case | Range |
//! |----------|----------|-------|
//! | [`gamma`] | Pure power law, mirrored for negatives | all reals |
//!
//! Web colors are treated as gamma 2.2 rather than the piecewise sRGB curve.
//! The curves are *mirrored*: `f(-x) = -f(x)`. Out-of-gamut intermediates
//! (and matrix round-off near black) routinely produce negative values, and
//! a plain fractional power would turn them into NaN.
//!
//! # Usage
//!
//! ```rust
//! use bgx_transfer::{decode, encode};
//!
//! let linear = decode(0.5);
//! let encoded = encode(linear);
//! assert!((encoded - 0.5).abs() < 1e-12);
//!
//! assert!(decode(-0.5).is_finite());
//! ```
//!
//! # Used By
//!
//! - `bgx-color` - encoding transform

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod gamma;

pub use gamma::{decode, encode, WEB_GAMMA};
