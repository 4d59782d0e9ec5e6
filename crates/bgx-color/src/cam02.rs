//! CIECAM02 color appearance model.
//!
//! Converts absolute XYZ (white at `Y = Y_w`) to lightness `J`,
//! colourfulness `M` and hue angle `h` under given viewing conditions, and
//! back. Full adaptation (`D = 1`) is assumed.
//!
//! # Pipeline
//!
//! ```text
//! XYZ -> CAT02 -> D_rgb -> HPE -> compress -> (a, b, A) -> J, C, h -> M
//! ```
//!
//! # Inverse branch rule
//!
//! Recovering `(a, b)` from chroma and hue divides by either `sin h` or
//! `cos h`. The inverse divides by whichever has the larger magnitude, so
//! the divisor is never smaller than `1/sqrt(2)`. Achromatic input
//! (`t` below [`EPSILON`]) skips the division and sets `a = b = 0`.

use std::f64::consts::PI;

use bgx_math::Vec3;
use tracing::debug;

use crate::ViewingConditions;

/// Stability epsilon substituted for vanishing denominators.
pub const EPSILON: f64 = 1e-6;

/// Largest magnitude the compressed response can take.
const COMPRESS_LIMIT: f64 = 400.0;

// ============================================================================
// Correlates
// ============================================================================

/// Lightness, colourfulness and hue.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jmh {
    /// Lightness `J` (0 = black, 100 = reference white).
    pub j: f64,
    /// Colourfulness `M` (never negative).
    pub m: f64,
    /// Hue angle `h` in degrees, `[0, 360)`.
    pub h: f64,
}

/// Lightness, chroma and hue.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jch {
    /// Lightness `J`.
    pub j: f64,
    /// Chroma `C` (never negative).
    pub c: f64,
    /// Hue angle `h` in degrees, `[0, 360)`.
    pub h: f64,
}

impl Jmh {
    /// Creates correlates, wrapping the hue and clamping `M` at zero.
    pub fn new(j: f64, m: f64, h: f64) -> Self {
        Self { j, m: m.max(0.0), h: wrap_hue(h) }
    }

    /// Converts colourfulness to chroma: `C = M / F_L^0.25`.
    pub fn to_jch(self, vc: &ViewingConditions) -> Jch {
        Jch { j: self.j, c: self.m / vc.f_l.powf(0.25), h: self.h }
    }
}

impl Jch {
    /// Creates correlates, wrapping the hue and clamping `C` at zero.
    pub fn new(j: f64, c: f64, h: f64) -> Self {
        Self { j, c: c.max(0.0), h: wrap_hue(h) }
    }

    /// Converts chroma to colourfulness: `M = C * F_L^0.25`.
    pub fn to_jmh(self, vc: &ViewingConditions) -> Jmh {
        Jmh { j: self.j, m: self.c * vc.f_l.powf(0.25), h: self.h }
    }
}

/// Wraps a hue angle in degrees into `[0, 360)`.
#[inline]
pub fn wrap_hue(h: f64) -> f64 {
    let h = h.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if h >= 360.0 { 0.0 } else { h }
}

// ============================================================================
// Post-adaptation compression
// ============================================================================

/// Post-adaptation cone response compression (Naka-Rushton), mirrored for
/// negative responses.
#[inline]
pub(crate) fn compress(v: f64, f_l: f64) -> f64 {
    let p = (f_l * v.abs() / 100.0).powf(0.42);
    (COMPRESS_LIMIT * p / (27.13 + p)).copysign(v) + 0.1
}

/// Inverse of [`compress`]. The magnitude is clamped just below the
/// asymptote so the result stays finite.
#[inline]
pub(crate) fn decompress(v: f64, f_l: f64) -> f64 {
    let x = v - 0.1;
    let ax = x.abs().min(COMPRESS_LIMIT - EPSILON);
    let base = 27.13 * ax / (COMPRESS_LIMIT - ax);
    (100.0 / f_l * base.powf(1.0 / 0.42)).copysign(x)
}

/// Eccentricity factor.
#[inline]
fn eccentricity(h_deg: f64) -> f64 {
    0.25 * ((h_deg * PI / 180.0 + 2.0).cos() + 3.8)
}

/// `(1.64 - 0.29^n)^0.73`
#[inline]
fn chroma_background_factor(n: f64) -> f64 {
    (1.64 - 0.29f64.powf(n)).powf(0.73)
}

// ============================================================================
// Forward / inverse
// ============================================================================

/// XYZ -> JMh.
///
/// `xyz` is absolute, on the same scale as [`ViewingConditions::white_xyz`].
pub fn xyz_to_jmh(xyz: Vec3, vc: &ViewingConditions) -> Jmh {
    let surround = vc.surround_params();

    // Chromatic adaptation (D = 1)
    let rgb_c = vc.d_rgb * (bgx_math::CAT02 * xyz);
    let rgb_p = vc.cat02_to_hpe * rgb_c;
    let rgb_a = rgb_p.map(|v| compress(v, vc.f_l));

    // Opponent signals
    let a = rgb_a.x - 12.0 * rgb_a.y / 11.0 + rgb_a.z / 11.0;
    let b = (rgb_a.x + rgb_a.y - 2.0 * rgb_a.z) / 9.0;
    let h = wrap_hue(b.atan2(a).to_degrees());

    // Achromatic response and lightness
    let big_a = (2.0 * rgb_a.x + rgb_a.y + rgb_a.z / 20.0 - 0.305) * vc.n_bb;
    let j = 100.0 * (big_a / vc.a_w).max(0.0).powf(surround.c * vc.z);

    // Chroma. The denominator only drops below epsilon for out-of-gamut
    // responses, where J is already 0 unless the L response dominates.
    let e_t = eccentricity(h);
    let mut denom = rgb_a.x + rgb_a.y + 21.0 / 20.0 * rgb_a.z;
    if denom < EPSILON {
        debug!(denom, "CIECAM02 chroma denominator below epsilon");
        denom = EPSILON;
    }
    let t = (50000.0 / 13.0 * surround.n_c * vc.n_cb * e_t * a.hypot(b)) / denom;
    let c = t.powf(0.9) * (j / 100.0).sqrt() * chroma_background_factor(vc.n);
    let m = c * vc.f_l.powf(0.25);

    Jmh { j, m: m.max(0.0), h }
}

/// JMh -> XYZ.
pub fn jmh_to_xyz(jmh: Jmh, vc: &ViewingConditions) -> Vec3 {
    let surround = vc.surround_params();
    let j = jmh.j.max(0.0);
    let c = jmh.m.max(0.0) / vc.f_l.powf(0.25);

    let t = if j > 0.0 {
        (c / ((j / 100.0).sqrt() * chroma_background_factor(vc.n))).powf(1.0 / 0.9)
    } else {
        0.0
    };

    let big_a = vc.a_w * (j / 100.0).powf(1.0 / (surround.c * vc.z));
    let p2 = big_a / vc.n_bb + 0.305;
    let p3 = 21.0 / 20.0;

    let (a, b) = if t < EPSILON {
        (0.0, 0.0)
    } else {
        let h_rad = jmh.h.to_radians();
        let (sin_h, cos_h) = h_rad.sin_cos();
        let e_t = eccentricity(jmh.h);
        let p1 = (50000.0 / 13.0 * surround.n_c * vc.n_cb) * e_t / t;
        let k = p2 * (2.0 + p3) * (460.0 / 1403.0);

        if sin_h.abs() >= cos_h.abs() {
            let p4 = p1 / sin_h;
            let b = k
                / (p4 + (2.0 + p3) * (220.0 / 1403.0) * (cos_h / sin_h) - 27.0 / 1403.0
                    + p3 * (6300.0 / 1403.0));
            (b * cos_h / sin_h, b)
        } else {
            let p5 = p1 / cos_h;
            let a = k
                / (p5 + (2.0 + p3) * (220.0 / 1403.0)
                    - (27.0 / 1403.0 - p3 * (6300.0 / 1403.0)) * (sin_h / cos_h));
            (a, a * sin_h / cos_h)
        }
    };

    let rgb_a = Vec3::new(
        (460.0 * p2 + 451.0 * a + 288.0 * b) / 1403.0,
        (460.0 * p2 - 891.0 * a - 261.0 * b) / 1403.0,
        (460.0 * p2 - 220.0 * a - 6300.0 * b) / 1403.0,
    );
    let rgb_p = rgb_a.map(|v| decompress(v, vc.f_l));
    let rgb_c = vc.hpe_to_cat02 * rgb_p;
    vc.cat02_inv * (rgb_c / vc.d_rgb)
}

// ============================================================================
// Encoded RGB <-> correlates
// ============================================================================

/// Encoded RGB -> absolute XYZ under `vc`.
#[inline]
pub fn rgb_to_xyz(rgb: Vec3, vc: &ViewingConditions) -> Vec3 {
    let enc = vc.encoding();
    enc.rgb_to_xyz(enc.decode(rgb)) * vc.y_w
}

/// Absolute XYZ under `vc` -> encoded RGB (not gamut mapped).
#[inline]
pub fn xyz_to_rgb(xyz: Vec3, vc: &ViewingConditions) -> Vec3 {
    let enc = vc.encoding();
    enc.encode(enc.xyz_to_rgb(xyz / vc.y_w))
}

/// Encoded RGB -> JMh.
pub fn rgb_to_jmh(rgb: Vec3, vc: &ViewingConditions) -> Jmh {
    xyz_to_jmh(rgb_to_xyz(rgb, vc), vc)
}

/// JMh -> encoded RGB. The result may lie outside `[0, 1]`.
pub fn jmh_to_rgb(jmh: Jmh, vc: &ViewingConditions) -> Vec3 {
    xyz_to_rgb(jmh_to_xyz(jmh, vc), vc)
}
