//! Cone response spaces for the CIECAM02 appearance model.
//!
//! CIECAM02 works in two sharpened cone spaces:
//!
//! - [`CAT02`] - where von Kries chromatic adaptation is applied
//! - [`HPE`] - Hunt-Pointer-Estevez, where post-adaptation compression is applied
//!
//! The model hops from the first to the second through [`cat02_to_hpe`].
//!
//! # Usage
//!
//! ```rust
//! use bgx_math::{CAT02, Vec3};
//!
//! let xyz_w = Vec3::new(95.047, 100.0, 108.883);
//! let rgb_w = CAT02 * xyz_w;
//! assert!(rgb_w.y > 0.0);
//! ```

use crate::Mat3;

/// CAT02 chromatic adaptation matrix (XYZ -> sharpened RGB).
///
/// From the CIECAM02 color appearance model.
pub const CAT02: Mat3 = Mat3::from_rows([
    [0.7328, 0.4296, -0.1624],
    [-0.7036, 1.6975, 0.0061],
    [0.0030, 0.0136, 0.9834],
]);

/// Hunt-Pointer-Estevez matrix (XYZ -> cone fundamentals), equal-energy normalized.
pub const HPE: Mat3 = Mat3::from_rows([
    [0.38971, 0.68898, -0.07868],
    [-0.22981, 1.18340, 0.04641],
    [0.00000, 0.00000, 1.00000],
]);

/// Matrix taking adapted CAT02 responses into the HPE cone space.
///
/// Uses the exact inverse of [`CAT02`], not the six-digit published one,
/// so the forward and inverse appearance model compose to identity up to
/// floating point error.
pub fn cat02_to_hpe() -> Option<Mat3> {
    Some(HPE * CAT02.inverse()?)
}

/// Matrix taking HPE cone responses back into the CAT02 space.
pub fn hpe_to_cat02() -> Option<Mat3> {
    cat02_to_hpe()?.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    fn assert_identity(m: Mat3, tol: f64) {
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (m.m[i][j] - expected).abs() < tol,
                    "m[{}][{}] = {} (expected {})",
                    i,
                    j,
                    m.m[i][j],
                    expected
                );
            }
        }
    }

    #[test]
    fn test_cat02_hpe_roundtrip() {
        let fwd = cat02_to_hpe().unwrap();
        let inv = hpe_to_cat02().unwrap();
        assert_identity(fwd * inv, 1e-12);
    }

    #[test]
    fn test_equal_energy_white_is_preserved() {
        // Both spaces are normalized so illuminant E maps to equal responses
        let e = Vec3::ONE;
        let cat = CAT02 * e;
        let hpe = HPE * e;
        for i in 0..3 {
            assert!((cat[i] - 1.0).abs() < 1e-3, "CAT02 E[{}] = {}", i, cat[i]);
            assert!((hpe[i] - 1.0).abs() < 1e-3, "HPE E[{}] = {}", i, hpe[i]);
        }
    }
}
