//! Viewing conditions and the background presets.
//!
//! A [`ViewingConditions`] value is built once per preset and carries every
//! constant the appearance model derives from `(Y_w, L_A, Y_b, surround)`.
//! Nothing in the pipeline looks conditions up by name. Names are resolved
//! at the boundary through [`Background`] or [`lookup_conditions`].

use std::fmt;
use std::str::FromStr;

use bgx_math::{CAT02, Mat3, Vec3, cat02_to_hpe, hpe_to_cat02};
use tracing::debug;

use crate::cam02::compress;
use crate::{ColorError, ColorResult, Encoding};

// ============================================================================
// Surround
// ============================================================================

/// CIECAM02 surround category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surround {
    /// Average surround (surface colors, normal office/web viewing).
    #[default]
    Average,
}

/// Induction constants `(F, c, N_c)` of a surround category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurroundParams {
    /// Maximum degree of adaptation.
    pub f: f64,
    /// Impact of surround.
    pub c: f64,
    /// Chromatic induction factor.
    pub n_c: f64,
}

impl Surround {
    /// Induction constants from the CIECAM02 viewing-condition table.
    pub const fn params(self) -> SurroundParams {
        match self {
            Self::Average => SurroundParams { f: 1.0, c: 0.69, n_c: 1.0 },
        }
    }
}

// ============================================================================
// Background presets
// ============================================================================

/// Named viewing background.
///
/// All three share `Y_w = 80`, `L_A = 16` and an average surround and differ
/// only in background luminance `Y_b`.
///
/// # Example
///
/// ```rust
/// use bgx_color::Background;
///
/// let bg: Background = "light".parse().unwrap();
/// assert_eq!(bg, Background::Light);
/// assert_eq!(bg.to_string(), "light");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Background {
    /// Near-black background (`Y_b = 0.8`).
    Dark,
    /// Mid-gray background (`Y_b = 16`).
    Neutral,
    /// White background (`Y_b = 80`).
    Light,
}

/// Reference white luminance shared by the presets.
pub const PRESET_Y_W: f64 = 80.0;
/// Adapting luminance shared by the presets.
pub const PRESET_L_A: f64 = 16.0;

impl Background {
    /// Every preset, darkest first.
    pub const ALL: [Background; 3] = [Self::Dark, Self::Neutral, Self::Light];

    /// Preset name as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Neutral => "neutral",
            Self::Light => "light",
        }
    }

    /// Relative background luminance `Y_b`.
    pub const fn y_b(self) -> f64 {
        match self {
            Self::Dark => 0.8,
            Self::Neutral => 16.0,
            Self::Light => 80.0,
        }
    }

    /// Builds the viewing conditions of this preset.
    pub fn conditions(self) -> ColorResult<ViewingConditions> {
        ViewingConditions::new(PRESET_Y_W, PRESET_L_A, self.y_b(), Surround::Average)
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Background {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "neutral" => Ok(Self::Neutral),
            "light" => Ok(Self::Light),
            _ => Err(ColorError::UnknownConditions(s.to_string())),
        }
    }
}

/// Resolves a preset name (`dark`, `neutral`, `light`) to its conditions.
///
/// # Errors
///
/// [`ColorError::UnknownConditions`] for any other name.
pub fn lookup_conditions(name: &str) -> ColorResult<ViewingConditions> {
    name.parse::<Background>()?.conditions()
}

/// The three presets, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Presets {
    dark: ViewingConditions,
    neutral: ViewingConditions,
    light: ViewingConditions,
}

impl Presets {
    /// Builds all presets.
    pub fn new() -> ColorResult<Self> {
        Ok(Self {
            dark: Background::Dark.conditions()?,
            neutral: Background::Neutral.conditions()?,
            light: Background::Light.conditions()?,
        })
    }

    /// Conditions of a preset.
    pub fn get(&self, bg: Background) -> &ViewingConditions {
        match bg {
            Background::Dark => &self.dark,
            Background::Neutral => &self.neutral,
            Background::Light => &self.light,
        }
    }

    /// Resolves a preset by name.
    pub fn lookup(&self, name: &str) -> ColorResult<&ViewingConditions> {
        Ok(self.get(name.parse()?))
    }
}

// ============================================================================
// Viewing conditions
// ============================================================================

/// Immutable viewing conditions with all derived model constants.
///
/// Discount-the-illuminant mode is assumed (`D = 1`), so the adaptation
/// depends only on the encoding's white point.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewingConditions {
    /// Reference white luminance `Y_w`.
    pub y_w: f64,
    /// Adapting field luminance `L_A` (cd/m^2).
    pub l_a: f64,
    /// Relative background luminance `Y_b`.
    pub y_b: f64,
    /// Surround category.
    pub surround: Surround,

    pub(crate) encoding: Encoding,
    pub(crate) cat02_inv: Mat3,
    pub(crate) cat02_to_hpe: Mat3,
    pub(crate) hpe_to_cat02: Mat3,
    pub(crate) xyz_w: Vec3,
    pub(crate) d_rgb: Vec3,
    pub(crate) f_l: f64,
    pub(crate) n: f64,
    pub(crate) n_bb: f64,
    pub(crate) n_cb: f64,
    pub(crate) z: f64,
    pub(crate) a_w: f64,
}

impl ViewingConditions {
    /// Derives viewing conditions for the sRGB encoding.
    ///
    /// # Errors
    ///
    /// [`ColorError::InvalidValue`] if any luminance is not finite and positive.
    pub fn new(y_w: f64, l_a: f64, y_b: f64, surround: Surround) -> ColorResult<Self> {
        Self::with_encoding(Encoding::srgb()?, y_w, l_a, y_b, surround)
    }

    /// Derives viewing conditions for an explicit encoding.
    pub fn with_encoding(
        encoding: Encoding,
        y_w: f64,
        l_a: f64,
        y_b: f64,
        surround: Surround,
    ) -> ColorResult<Self> {
        for (name, v) in [("Y_w", y_w), ("L_A", l_a), ("Y_b", y_b)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ColorError::InvalidValue(format!(
                    "{} must be finite and positive, got {}",
                    name, v
                )));
            }
        }

        let singular = || ColorError::MatrixError("CAT02/HPE matrix is singular".into());
        let cat02_inv = CAT02.inverse().ok_or_else(singular)?;
        let cat02_to_hpe = cat02_to_hpe().ok_or_else(singular)?;
        let hpe_to_cat02 = hpe_to_cat02().ok_or_else(singular)?;

        let xyz_w = encoding.white_xyz() * y_w;
        let rgb_w = CAT02 * xyz_w;
        let d_rgb = Vec3::splat(y_w) / rgb_w;

        let k = 1.0 / (5.0 * l_a + 1.0);
        let k4 = k * k * k * k;
        let f_l = 0.2 * k4 * (5.0 * l_a) + 0.1 * (1.0 - k4).powi(2) * (5.0 * l_a).cbrt();

        let n = y_b / y_w;
        let n_bb = 0.725 * n.powf(-0.2);
        let z = 1.48 + n.sqrt();

        // Adapted white is (Y_w, Y_w, Y_w) by construction of D_rgb
        let rgb_pw = cat02_to_hpe * (d_rgb * rgb_w);
        let rgb_aw = rgb_pw.map(|v| compress(v, f_l));
        let a_w = (2.0 * rgb_aw.x + rgb_aw.y + rgb_aw.z / 20.0 - 0.305) * n_bb;

        if !(a_w.is_finite() && a_w > 0.0) {
            return Err(ColorError::InvalidValue(format!(
                "achromatic response of white is {}",
                a_w
            )));
        }

        debug!(y_w, l_a, y_b, f_l, n, z, a_w, "derived viewing conditions");

        Ok(Self {
            y_w,
            l_a,
            y_b,
            surround,
            encoding,
            cat02_inv,
            cat02_to_hpe,
            hpe_to_cat02,
            xyz_w,
            d_rgb,
            f_l,
            n,
            n_bb,
            n_cb: n_bb,
            z,
            a_w,
        })
    }

    /// Encoding colorspace these conditions were derived for.
    #[inline]
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Surround induction constants.
    #[inline]
    pub fn surround_params(&self) -> SurroundParams {
        self.surround.params()
    }

    /// Luminance-level adaptation factor `F_L`.
    #[inline]
    pub fn f_l(&self) -> f64 {
        self.f_l
    }

    /// Background induction factor `n = Y_b / Y_w`.
    #[inline]
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Base exponential nonlinearity `z`.
    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Achromatic response of the reference white.
    #[inline]
    pub fn a_w(&self) -> f64 {
        self.a_w
    }

    /// Absolute XYZ of the reference white (`Y = Y_w`).
    #[inline]
    pub fn white_xyz(&self) -> Vec3 {
        self.xyz_w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup_presets() {
        for bg in Background::ALL {
            let vc = lookup_conditions(bg.name()).unwrap();
            assert_eq!(vc.y_w, 80.0);
            assert_eq!(vc.l_a, 16.0);
            assert_eq!(vc.y_b, bg.y_b());
            assert_eq!(vc.surround, Surround::Average);
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let err = lookup_conditions("dim").unwrap_err();
        assert_eq!(err, ColorError::UnknownConditions("dim".into()));
    }

    #[test]
    fn test_background_parse_is_case_insensitive() {
        assert_eq!(" Neutral ".parse::<Background>().unwrap(), Background::Neutral);
        assert_eq!("DARK".parse::<Background>().unwrap(), Background::Dark);
    }

    #[test]
    fn test_presets_registry() {
        let presets = Presets::new().unwrap();
        assert_eq!(presets.get(Background::Dark).y_b, 0.8);
        assert_eq!(presets.lookup("light").unwrap().y_b, 80.0);
        assert!(presets.lookup("").is_err());
    }

    #[test]
    fn test_derived_constants() {
        let vc = Background::Neutral.conditions().unwrap();
        // F_L for L_A = 16
        assert_relative_eq!(vc.f_l(), 0.43089, epsilon = 1e-4);
        assert_relative_eq!(vc.n(), 0.2);
        assert_relative_eq!(vc.z(), 1.48 + 0.2f64.sqrt());
        assert_relative_eq!(vc.n_bb, 0.725 * 0.2f64.powf(-0.2));
        assert_eq!(vc.n_bb, vc.n_cb);
        assert_relative_eq!(vc.white_xyz().y, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_adapted_white_is_equal_energy() {
        let vc = Background::Dark.conditions().unwrap();
        let rgb_wc = vc.d_rgb * (CAT02 * vc.white_xyz());
        for i in 0..3 {
            assert_relative_eq!(rgb_wc[i], 80.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_luminance() {
        assert!(matches!(
            ViewingConditions::new(80.0, 0.0, 16.0, Surround::Average),
            Err(ColorError::InvalidValue(_))
        ));
        assert!(matches!(
            ViewingConditions::new(f64::NAN, 16.0, 16.0, Surround::Average),
            Err(ColorError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_average_surround() {
        let p = Surround::Average.params();
        assert_eq!((p.f, p.c, p.n_c), (1.0, 0.69, 1.0));
    }
}
