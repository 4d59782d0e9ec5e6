//! CAM02-UCS uniform color space.
//!
//! Compresses CIECAM02 lightness and colourfulness so that Euclidean
//! distance approximates perceived difference (Luo, Cui and Li, 2006):
//!
//! ```text
//! J' = (1 + 100 c1) J / (1 + c1 J)
//! M' = ln(1 + c2 M) / c2
//! a' = M' cos h,  b' = M' sin h
//! ```

use bgx_math::Vec3;

use crate::ViewingConditions;
use crate::cam02::{Jmh, rgb_to_jmh, wrap_hue};

/// Lightness weight `K_L`.
pub const K_L: f64 = 1.0;
/// Lightness compression `c1`.
pub const C1: f64 = 0.007;
/// Colourfulness compression `c2`.
pub const C2: f64 = 0.0228;

/// A point in CAM02-UCS.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jab {
    /// Uniform lightness `J'`.
    pub j: f64,
    /// Red-green `a'`.
    pub a: f64,
    /// Yellow-blue `b'`.
    pub b: f64,
}

impl Jab {
    /// Creates a point.
    pub const fn new(j: f64, a: f64, b: f64) -> Self {
        Self { j, a, b }
    }

    /// Squared Euclidean distance, weighting lightness by `1 / K_L`.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dj = (self.j - other.j) / K_L;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dj * dj + da * da + db * db
    }

    /// Scales lightness by `j_factor` and both chromatic axes by `m_factor`.
    /// Hue is unchanged.
    #[inline]
    pub fn scale(self, j_factor: f64, m_factor: f64) -> Self {
        Self::new(self.j * j_factor, self.a * m_factor, self.b * m_factor)
    }
}

impl From<Jab> for Vec3 {
    fn from(v: Jab) -> Vec3 {
        Vec3::new(v.j, v.a, v.b)
    }
}

/// JMh -> CAM02-UCS.
#[inline]
pub fn to_uniform(jmh: Jmh) -> Jab {
    let j = (1.0 + 100.0 * C1) * jmh.j / (1.0 + C1 * jmh.j);
    let m = (C2 * jmh.m).ln_1p() / C2;
    let (sin_h, cos_h) = jmh.h.to_radians().sin_cos();
    Jab::new(j, m * cos_h, m * sin_h)
}

/// CAM02-UCS -> JMh. Exact inverse of [`to_uniform`].
#[inline]
pub fn from_uniform(jab: Jab) -> Jmh {
    let j = jab.j / (1.0 + 100.0 * C1 - C1 * jab.j);
    let m_p = jab.a.hypot(jab.b);
    let m = (C2 * m_p).exp_m1() / C2;
    let h = wrap_hue(jab.b.atan2(jab.a).to_degrees());
    Jmh { j, m, h }
}

/// Encoded RGB -> CAM02-UCS under `vc`.
pub fn rgb_to_jab(rgb: Vec3, vc: &ViewingConditions) -> Jab {
    to_uniform(rgb_to_jmh(rgb, vc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uniform_roundtrip() {
        for j in [0.0, 1.0, 25.0, 50.0, 99.0, 100.0] {
            for m in [0.0, 0.5, 10.0, 33.0, 50.0] {
                for h in [0.0, 10.0, 90.0, 179.0, 200.0, 300.0, 359.5] {
                    let jmh = Jmh::new(j, m, h);
                    let back = from_uniform(to_uniform(jmh));
                    assert_abs_diff_eq!(back.j, j, epsilon = 1e-9);
                    assert_abs_diff_eq!(back.m, m, epsilon = 1e-9);
                    if m > 0.0 {
                        let dh = (back.h - h + 180.0).rem_euclid(360.0) - 180.0;
                        assert!(dh.abs() < 1e-9, "h={} back={}", h, back.h);
                    }
                }
            }
        }
    }

    #[test]
    fn test_white_maps_to_100() {
        let jab = to_uniform(Jmh::new(100.0, 0.0, 0.0));
        assert_abs_diff_eq!(jab.j, 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compression_shrinks_colourfulness() {
        let jab = to_uniform(Jmh::new(50.0, 40.0, 0.0));
        assert!(jab.a < 40.0 && jab.a > 0.0);
        assert_abs_diff_eq!(jab.b, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_preserves_hue() {
        let jab = to_uniform(Jmh::new(50.0, 20.0, 123.0));
        let scaled = from_uniform(jab.scale(1.2, 0.5));
        assert_abs_diff_eq!(scaled.h, 123.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distance() {
        let a = Jab::new(50.0, 1.0, 2.0);
        let b = Jab::new(53.0, 5.0, 2.0);
        assert_abs_diff_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.distance_squared(a), 0.0);
    }
}
