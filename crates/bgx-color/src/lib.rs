//! # bgx-color
//!
//! Perceptual color translation between viewing backgrounds.
//!
//! A color that looks right on a dark page looks different on a white one.
//! This crate re-renders a foreground color so that it keeps its appearance
//! when the background changes, using the CIECAM02 appearance model and its
//! uniform space CAM02-UCS:
//!
//! - **Viewing conditions** - dark / neutral / light presets ([`Background`])
//! - **Encoding** - sRGB primaries with mirrored gamma 2.2 ([`Encoding`])
//! - **Appearance model** - CIECAM02 forward and inverse ([`cam02`])
//! - **Uniform space** - CAM02-UCS ([`ucs`])
//! - **Gamut mapping** - box-constrained optimization in CAM02-UCS ([`gamut`])
//! - **Translation** - the full pipeline, single and batched ([`Translator`])
//!
//! # Architecture
//!
//! ```text
//!                    bgx-color
//!                        |
//!     +------------------+------------------+
//!     |                                     |
//! bgx-transfer                        bgx-primaries
//!     |                                     |
//!     +------------------+------------------+
//!                        |
//!                    bgx-math
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use bgx_color::{lookup_conditions, translate};
//! use bgx_color::math::Vec3;
//!
//! let dark = lookup_conditions("dark").unwrap();
//! let light = lookup_conditions("light").unwrap();
//!
//! // Same color, rendered for a white page
//! let fg = Vec3::new(0.4, 0.6, 0.9);
//! let out = translate(fg, &dark, &light, 1.0, 1.0).unwrap();
//! assert!(out.in_unit_cube());
//! ```
//!
//! # Errors and diagnostics
//!
//! Hard failures are [`ColorError`]. Batch operations return one
//! [`ColorResult`] per color. Numerical soft conditions are logged through
//! `tracing`: stability-epsilon substitutions at `debug`, gamut mapping that
//! exhausts its iteration budget at `warn`.
//!
//! # Dependencies
//!
//! - [`bgx-math`] - Vec3, Mat3, CAT02 / HPE matrices
//! - [`bgx-transfer`] - Mirrored gamma
//! - [`bgx-primaries`] - sRGB primaries and derived matrices
//! - [`rayon`] - Parallel batches
//! - [`tracing`] - Diagnostics
//!
//! # Used By
//!
//! - `bgx-cli` - Command line interface
//! - `bgx-bench` - Benchmarks

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod conditions;
mod encoding;
pub mod cam02;
pub mod ucs;
pub mod gamut;
mod translate;

pub use error::{ColorError, ColorResult};
pub use conditions::{
    Background, PRESET_L_A, PRESET_Y_W, Presets, Surround, SurroundParams, ViewingConditions,
    lookup_conditions,
};
pub use encoding::Encoding;
pub use cam02::{Jch, Jmh, jmh_to_rgb, rgb_to_jmh};
pub use ucs::{Jab, from_uniform, to_uniform};
pub use gamut::{
    GamutMapOptions, GamutMapReport, Method, map_batch_to_gamut, map_jab_to_gamut, map_to_gamut,
    map_to_gamut_with, squared_uniform_distance,
};
pub use translate::{Translator, translate, translate_batch, translate_batch_cancellable};

// Re-export sub-crates for convenience
pub use bgx_math as math;
pub use bgx_primaries as primaries;
pub use bgx_transfer as transfer;

/// Prelude with commonly used types
pub mod prelude {
    pub use crate::{
        Background, ColorError, ColorResult, GamutMapOptions, Method, Translator,
        ViewingConditions, lookup_conditions, map_to_gamut, translate, translate_batch,
    };
    pub use bgx_math::Vec3;
}
