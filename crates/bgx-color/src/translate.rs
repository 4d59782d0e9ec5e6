//! Background-to-background color translation.
//!
//! A foreground color seen against one background is re-rendered so it looks
//! the same against another:
//!
//! ```text
//! RGB -> JMh (src) -> Jab -> scale -> Jab -> JMh -> RGB (dst) -> gamut map (dst)
//! ```
//!
//! The gamut mapper minimizes the CAM02-UCS distance to the scaled `Jab`
//! itself, so a target the inverse model cannot reach still pulls the
//! result toward its hue and lightness.
//!
//! Lightness and colourfulness scaling happen in CAM02-UCS, so hue is left
//! exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use bgx_color::{Background, translate};
//! use bgx_color::math::Vec3;
//!
//! let dark = Background::Dark.conditions().unwrap();
//! let light = Background::Light.conditions().unwrap();
//!
//! let out = translate(Vec3::new(0.2, 0.7, 0.9), &dark, &light, 1.0, 1.0).unwrap();
//! assert!(out.in_unit_cube());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use bgx_math::Vec3;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::cam02::{Jmh, jmh_to_rgb, rgb_to_jmh};
use crate::gamut::{GamutMapOptions, GamutMapReport, map_jab_to_gamut};
use crate::ucs::{from_uniform, rgb_to_jab, to_uniform};
use crate::{ColorError, ColorResult, ViewingConditions};

/// Translates colors from a source to a destination viewing context.
///
/// Holds the resolved conditions, the scaling factors and the gamut mapper
/// options. Cheap to copy and safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    src: &'a ViewingConditions,
    dst: &'a ViewingConditions,
    j_factor: f64,
    m_factor: f64,
    options: GamutMapOptions,
}

impl<'a> Translator<'a> {
    /// Translator with unit factors and default gamut mapping.
    pub fn new(src: &'a ViewingConditions, dst: &'a ViewingConditions) -> Self {
        Self {
            src,
            dst,
            j_factor: 1.0,
            m_factor: 1.0,
            options: GamutMapOptions::default(),
        }
    }

    /// Sets the lightness and colourfulness factors.
    pub fn factors(mut self, j_factor: f64, m_factor: f64) -> Self {
        self.j_factor = j_factor;
        self.m_factor = m_factor;
        self
    }

    /// Sets the gamut mapper options.
    pub fn options(mut self, options: GamutMapOptions) -> Self {
        self.options = options;
        self
    }

    /// Source conditions.
    pub fn src(&self) -> &'a ViewingConditions {
        self.src
    }

    /// Destination conditions.
    pub fn dst(&self) -> &'a ViewingConditions {
        self.dst
    }

    fn validate(&self, fg: Vec3) -> ColorResult<()> {
        if !fg.is_finite() {
            return Err(ColorError::InvalidValue(format!(
                "non-finite RGB {:?}",
                fg.to_array()
            )));
        }
        for (name, v) in [("J factor", self.j_factor), ("M factor", self.m_factor)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ColorError::InvalidValue(format!(
                    "{} must be finite and non-negative, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Destination correlates: source appearance scaled in CAM02-UCS, with
    /// lightness clamped to `[0, 100]`.
    fn target(&self, fg: Vec3) -> ColorResult<Jmh> {
        self.validate(fg)?;

        let mut jab = to_uniform(rgb_to_jmh(fg, self.src)).scale(self.j_factor, self.m_factor);
        // J' is monotone in J with J'(0) = 0 and J'(100) = 100, and its
        // inverse has a pole above that range
        if !(0.0..=100.0).contains(&jab.j) {
            debug!(j = jab.j, "clamping scaled lightness");
            jab.j = jab.j.clamp(0.0, 100.0);
        }
        let mut jmh = from_uniform(jab);
        jmh.j = jmh.j.clamp(0.0, 100.0);
        Ok(jmh)
    }

    /// Translated color before gamut mapping. May leave `[0, 1]`.
    pub fn translate_unmapped(&self, fg: Vec3) -> ColorResult<Vec3> {
        Ok(jmh_to_rgb(self.target(fg)?, self.dst))
    }

    /// Translates one color and reports the gamut mapping outcome.
    ///
    /// Out-of-gamut results are mapped toward the scaled correlates, not
    /// toward the appearance of the unmapped RGB. Colourfulness beyond what
    /// the inverse model can represent saturates its compression and yields
    /// an RGB triplet whose own appearance is unrelated (often black).
    pub fn translate_report(&self, fg: Vec3) -> ColorResult<GamutMapReport> {
        trace!(
            r = fg.x,
            g = fg.y,
            b = fg.z,
            j_factor = self.j_factor,
            m_factor = self.m_factor,
            "translate"
        );
        let jmh = self.target(fg)?;
        let candidate = jmh_to_rgb(jmh, self.dst);
        if candidate.in_unit_cube() {
            return Ok(GamutMapReport {
                rgb: candidate,
                loss: 0.0,
                iterations: 0,
                converged: true,
            });
        }

        // Start from whichever of the clamped candidate and the clamped
        // input lies closer to the target
        let target = to_uniform(jmh);
        let loss = |x: Vec3| rgb_to_jab(x, self.dst).distance_squared(target);
        let start = [candidate, fg]
            .into_iter()
            .filter(|x| x.is_finite())
            .map(Vec3::clamp01)
            .min_by(|a, b| loss(*a).total_cmp(&loss(*b)))
            .unwrap_or(Vec3::ZERO);
        if start != candidate.clamp01() {
            debug!(
                r = candidate.x,
                g = candidate.y,
                b = candidate.z,
                "unmapped color strays from target, starting from input"
            );
        }

        map_jab_to_gamut(target, start, self.dst, &self.options)
    }

    /// Translates one color.
    pub fn translate(&self, fg: Vec3) -> ColorResult<Vec3> {
        self.translate_report(fg).map(|r| r.rgb)
    }

    /// Translates every color independently, in parallel.
    ///
    /// The output has one entry per input, in input order. A failing color
    /// does not affect the others.
    pub fn translate_batch(&self, colors: &[Vec3]) -> Vec<ColorResult<Vec3>> {
        colors.par_iter().map(|&c| self.translate(c)).collect()
    }

    /// Like [`translate_batch`](Self::translate_batch), but colors not yet
    /// started when `cancel` becomes true are skipped and yield `None`.
    pub fn translate_batch_cancellable(
        &self,
        colors: &[Vec3],
        cancel: &AtomicBool,
    ) -> Vec<Option<ColorResult<Vec3>>> {
        colors
            .par_iter()
            .map(|&c| {
                if cancel.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(self.translate(c))
                }
            })
            .collect()
    }
}

/// Translates `fg` from `src` to `dst`, scaling lightness by `j_factor` and
/// colourfulness by `m_factor` (pass 1.0 for no change).
///
/// # Errors
///
/// [`ColorError::InvalidValue`] for non-finite input or negative factors.
pub fn translate(
    fg: Vec3,
    src: &ViewingConditions,
    dst: &ViewingConditions,
    j_factor: f64,
    m_factor: f64,
) -> ColorResult<Vec3> {
    Translator::new(src, dst).factors(j_factor, m_factor).translate(fg)
}

/// Batched [`translate`]. Order-preserving, one result per input.
pub fn translate_batch(
    colors: &[Vec3],
    src: &ViewingConditions,
    dst: &ViewingConditions,
    j_factor: f64,
    m_factor: f64,
) -> Vec<ColorResult<Vec3>> {
    Translator::new(src, dst)
        .factors(j_factor, m_factor)
        .translate_batch(colors)
}

/// Batched [`translate`] with cooperative cancellation at color granularity.
pub fn translate_batch_cancellable(
    colors: &[Vec3],
    src: &ViewingConditions,
    dst: &ViewingConditions,
    j_factor: f64,
    m_factor: f64,
    cancel: &AtomicBool,
) -> Vec<Option<ColorResult<Vec3>>> {
    Translator::new(src, dst)
        .factors(j_factor, m_factor)
        .translate_batch_cancellable(colors, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Background, lookup_conditions};

    fn assert_close(a: Vec3, b: Vec3, tol: f64) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < tol, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_identity_under_same_conditions() {
        for bg in Background::ALL {
            let vc = bg.conditions().unwrap();
            for c in [Vec3::splat(0.5), Vec3::new(0.2, 0.7, 0.9), Vec3::ONE, Vec3::ZERO] {
                let out = translate(c, &vc, &vc, 1.0, 1.0).unwrap();
                assert_close(out, c, 1e-3);
            }
        }
    }

    #[test]
    fn test_gray_stays_gray() {
        for src in Background::ALL {
            for dst in Background::ALL {
                let s = src.conditions().unwrap();
                let d = dst.conditions().unwrap();
                for v in [0.1, 0.5, 0.9] {
                    let out = translate(Vec3::splat(v), &s, &d, 1.0, 1.0).unwrap();
                    let spread = out.max_element() - out.min_element();
                    assert!(spread < 1e-3, "{} -> {}: {:?}", src, dst, out);
                }
            }
        }
    }

    #[test]
    fn test_black_dark_to_light() {
        let dark = lookup_conditions("dark").unwrap();
        let light = lookup_conditions("light").unwrap();
        let out = translate(Vec3::ZERO, &dark, &light, 1.0, 1.0).unwrap();
        assert!(out.is_finite());
        assert!(out.in_unit_cube());
    }

    #[test]
    fn test_light_background_needs_brighter_gray() {
        // Same J on a lighter background needs more luminance
        let dark = Background::Dark.conditions().unwrap();
        let light = Background::Light.conditions().unwrap();
        let out = translate(Vec3::splat(0.5), &dark, &light, 1.0, 1.0).unwrap();
        assert!(out.x > 0.5, "{:?}", out);
    }

    #[test]
    fn test_zero_m_factor_desaturates() {
        let vc = Background::Neutral.conditions().unwrap();
        let out = translate(Vec3::new(0.8, 0.3, 0.2), &vc, &vc, 1.0, 0.0).unwrap();
        assert!(out.max_element() - out.min_element() < 1e-3, "{:?}", out);
    }

    #[test]
    fn test_j_factor_darkens() {
        let vc = Background::Neutral.conditions().unwrap();
        let c = Vec3::new(0.6, 0.5, 0.4);
        let out = translate(c, &vc, &vc, 0.5, 1.0).unwrap();
        assert!(out.mean() < c.mean());
    }

    #[test]
    fn test_large_j_factor_clamps_to_white() {
        let vc = Background::Neutral.conditions().unwrap();
        let out = translate(Vec3::splat(0.8), &vc, &vc, 10.0, 1.0).unwrap();
        assert!(out.in_unit_cube());
        assert_close(out, Vec3::ONE, 1e-3);
    }

    #[test]
    fn test_boosted_blue_stays_blue() {
        // Boosted colourfulness saturates the inverse compression
        let dark = Background::Dark.conditions().unwrap();
        let neutral = Background::Neutral.conditions().unwrap();
        let light = Background::Light.conditions().unwrap();

        let cases = [
            (Vec3::new(0.1, 0.1, 0.9), &dark, &neutral, 1.3),
            (Vec3::new(0.0, 0.0, 1.0), &neutral, &light, 1.6),
        ];
        for (fg, src, dst, m_factor) in cases {
            let t = Translator::new(src, dst).factors(1.0, m_factor);
            assert!(!t.translate_unmapped(fg).unwrap().in_unit_cube());

            let out = t.translate(fg).unwrap();
            assert!(out.in_unit_cube());
            assert!(out.z > 0.9, "{:?} -> {:?}", fg, out);
            assert!(out.z - out.x.max(out.y) > 0.5, "{:?} -> {:?}", fg, out);
        }
    }

    #[test]
    fn test_report_loss_is_distance_to_scaled_target() {
        let dark = Background::Dark.conditions().unwrap();
        let neutral = Background::Neutral.conditions().unwrap();
        let t = Translator::new(&dark, &neutral).factors(1.0, 1.3);
        let fg = Vec3::new(0.1, 0.1, 0.9);
        let report = t.translate_report(fg).unwrap();
        let target = to_uniform(t.target(fg).unwrap());
        let loss = rgb_to_jab(report.rgb, &neutral).distance_squared(target);
        assert!((report.loss - loss).abs() <= 1e-9 * loss.max(1.0));
    }

    #[test]
    fn test_invalid_inputs() {
        let vc = Background::Neutral.conditions().unwrap();
        assert!(translate(Vec3::new(f64::INFINITY, 0.0, 0.0), &vc, &vc, 1.0, 1.0).is_err());
        assert!(translate(Vec3::splat(0.5), &vc, &vc, f64::NAN, 1.0).is_err());
        assert!(translate(Vec3::splat(0.5), &vc, &vc, 1.0, -1.0).is_err());
    }

    #[test]
    fn test_batch_order_and_errors() {
        let dark = Background::Dark.conditions().unwrap();
        let light = Background::Light.conditions().unwrap();
        let colors = vec![
            Vec3::new(0.9, 0.1, 0.1),
            Vec3::new(f64::NAN, 0.0, 0.0),
            Vec3::new(0.1, 0.2, 0.9),
            Vec3::splat(0.3),
        ];
        let batch = translate_batch(&colors, &dark, &light, 1.0, 1.2);
        assert_eq!(batch.len(), colors.len());
        assert!(batch[1].is_err());
        for i in [0, 2, 3] {
            let single = translate(colors[i], &dark, &light, 1.0, 1.2).unwrap();
            assert_eq!(batch[i].as_ref().unwrap(), &single);
        }
    }

    #[test]
    fn test_batch_cancelled_up_front() {
        let vc = Background::Neutral.conditions().unwrap();
        let colors = vec![Vec3::splat(0.4); 8];
        let cancel = AtomicBool::new(true);
        let out = translate_batch_cancellable(&colors, &vc, &vc, 1.0, 1.0, &cancel);
        assert_eq!(out.len(), 8);
        assert!(out.iter().all(Option::is_none));

        let go = AtomicBool::new(false);
        let out = translate_batch_cancellable(&colors, &vc, &vc, 1.0, 1.0, &go);
        assert!(out.iter().all(|r| matches!(r, Some(Ok(_)))));
    }

    #[test]
    fn test_translator_builder() {
        let src = Background::Dark.conditions().unwrap();
        let dst = Background::Neutral.conditions().unwrap();
        let t = Translator::new(&src, &dst)
            .factors(1.0, 1.0)
            .options(GamutMapOptions::for_method(crate::Method::AdaGrad));
        assert_eq!(t.src().y_b, 0.8);
        assert_eq!(t.dst().y_b, 16.0);
        let report = t.translate_report(Vec3::new(0.1, 0.9, 0.1)).unwrap();
        assert!(report.rgb.in_unit_cube());
    }
}
