//! Gamut mapping in CAM02-UCS.
//!
//! An out-of-range RGB candidate is projected to the point of the unit cube
//! closest to it in CAM02-UCS under the destination viewing conditions:
//!
//! ```text
//! minimize  |Jab(x) - Jab(rgb)|^2   subject to  x in [0, 1]^3
//! ```
//!
//! The objective is non-convex, so the result is a local optimum reached from
//! the clamped input. Gradients are forward finite differences.
//!
//! # Methods
//!
//! | Method | Step | Convergence |
//! |--------|------|-------------|
//! | [`Method::Lbfgsb`] | projected L-BFGS, Armijo backtracking | projected gradient or relative decrease |
//! | [`Method::ProjectedGradient`] | steepest descent, step halving | mean absolute step |
//! | [`Method::BarzilaiBorwein`] | BB step size | mean absolute step |
//! | [`Method::AdaGrad`] | AdaGrad | mean absolute step |
//!
//! Every method returns the best point it visited when the iteration budget
//! runs out. The result is clamped to the cube before it is returned.

mod first_order;
mod lbfgsb;

use std::fmt;
use std::str::FromStr;

use bgx_math::Vec3;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::ucs::{Jab, rgb_to_jab};
use crate::{ColorError, ColorResult, ViewingConditions};

// ============================================================================
// Options
// ============================================================================

/// Optimizer used by the gamut mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Bounded limited-memory quasi-Newton.
    #[default]
    Lbfgsb,
    /// Projected steepest descent with step halving.
    ProjectedGradient,
    /// Projected gradient with Barzilai-Borwein step size.
    BarzilaiBorwein,
    /// Projected AdaGrad.
    AdaGrad,
}

impl Method {
    /// Every method, default first.
    pub const ALL: [Method; 4] = [
        Self::Lbfgsb,
        Self::ProjectedGradient,
        Self::BarzilaiBorwein,
        Self::AdaGrad,
    ];

    /// Canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lbfgsb => "lbfgsb",
            Self::ProjectedGradient => "grad",
            Self::BarzilaiBorwein => "bb",
            Self::AdaGrad => "adagrad",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lbfgsb" | "l-bfgs-b" => Ok(Self::Lbfgsb),
            "grad" | "projected-gradient" => Ok(Self::ProjectedGradient),
            "bb" | "barzilai-borwein" => Ok(Self::BarzilaiBorwein),
            "adagrad" => Ok(Self::AdaGrad),
            _ => Err(ColorError::InvalidValue(format!(
                "unknown gamut mapping method {:?} (expected lbfgsb, grad, bb or adagrad)",
                s
            ))),
        }
    }
}

/// Gamut mapper configuration.
///
/// `tolerance` is the projected-gradient threshold for [`Method::Lbfgsb`]
/// and the mean-absolute-step threshold for the first-order methods. Use
/// [`GamutMapOptions::for_method`] for per-method defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamutMapOptions {
    /// Optimizer.
    pub method: Method,
    /// Iteration ceiling.
    pub max_iterations: usize,
    /// Convergence threshold.
    pub tolerance: f64,
    /// Forward finite-difference step.
    pub gradient_step: f64,
    /// Correction pairs kept by L-BFGS.
    pub history: usize,
}

impl Default for GamutMapOptions {
    fn default() -> Self {
        Self {
            method: Method::Lbfgsb,
            max_iterations: 200,
            tolerance: 1e-5,
            gradient_step: 1e-8,
            history: 10,
        }
    }
}

impl GamutMapOptions {
    /// Defaults tuned for `method`.
    pub fn for_method(method: Method) -> Self {
        let tolerance = match method {
            Method::Lbfgsb => 1e-5,
            _ => 1e-4,
        };
        Self { method, tolerance, ..Self::default() }
    }

    fn validate(&self) -> ColorResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ColorError::InvalidValue(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !(self.gradient_step.is_finite() && self.gradient_step > 0.0) {
            return Err(ColorError::InvalidValue(format!(
                "gradient step must be finite and positive, got {}",
                self.gradient_step
            )));
        }
        Ok(())
    }
}

/// Outcome of mapping one color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamutMapReport {
    /// Mapped color, every component in `[0, 1]`.
    pub rgb: Vec3,
    /// Squared CAM02-UCS distance between `rgb` and the input.
    pub loss: f64,
    /// Optimizer iterations performed (0 on the fast path).
    pub iterations: usize,
    /// False when the iteration budget ran out first.
    pub converged: bool,
}

// ============================================================================
// Objective
// ============================================================================

/// Squared distance to a fixed target in CAM02-UCS.
pub(crate) struct Objective<'a> {
    target: Jab,
    vc: &'a ViewingConditions,
    step: f64,
}

impl<'a> Objective<'a> {
    fn new(target: Jab, vc: &'a ViewingConditions, step: f64) -> Self {
        Self { target, vc, step }
    }

    #[inline]
    fn loss(&self, x: Vec3) -> f64 {
        rgb_to_jab(x, self.vc).distance_squared(self.target)
    }

    /// Forward-difference gradient at `x`, given `fx = loss(x)`.
    fn gradient(&self, x: Vec3, fx: f64) -> Vec3 {
        let mut g = Vec3::ZERO;
        for i in 0..3 {
            let mut xh = x;
            xh[i] += self.step;
            g[i] = (self.loss(xh) - fx) / self.step;
        }
        g
    }
}

/// Result of one optimizer run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Solution {
    x: Vec3,
    loss: f64,
    iterations: usize,
    converged: bool,
}

// ============================================================================
// Public API
// ============================================================================

/// Squared CAM02-UCS distance between two encoded RGB colors under `vc`.
///
/// ```rust
/// use bgx_color::{Background, squared_uniform_distance};
/// use bgx_color::math::Vec3;
///
/// let vc = Background::Neutral.conditions().unwrap();
/// let d = squared_uniform_distance(Vec3::splat(0.4), Vec3::splat(0.5), &vc);
/// assert!(d > 0.0);
/// ```
pub fn squared_uniform_distance(rgb1: Vec3, rgb2: Vec3, vc: &ViewingConditions) -> f64 {
    rgb_to_jab(rgb1, vc).distance_squared(rgb_to_jab(rgb2, vc))
}

/// Maps `rgb` into `[0, 1]^3` with the default optimizer.
///
/// Colors already inside the cube are returned unchanged.
///
/// # Errors
///
/// [`ColorError::InvalidValue`] for non-finite components.
pub fn map_to_gamut(rgb: Vec3, vc: &ViewingConditions) -> ColorResult<Vec3> {
    map_to_gamut_with(rgb, vc, &GamutMapOptions::default()).map(|r| r.rgb)
}

/// Maps `rgb` into `[0, 1]^3` and reports how the optimizer fared.
///
/// A candidate whose achromatic response is not positive has `J = 0` and
/// no hue in the model, so every such color would map to black. Those are
/// clamped to the cube instead.
pub fn map_to_gamut_with(
    rgb: Vec3,
    vc: &ViewingConditions,
    options: &GamutMapOptions,
) -> ColorResult<GamutMapReport> {
    if !rgb.is_finite() {
        return Err(ColorError::InvalidValue(format!("non-finite RGB {:?}", rgb.to_array())));
    }
    options.validate()?;

    if rgb.in_unit_cube() {
        debug!(r = rgb.x, g = rgb.y, b = rgb.z, "in gamut, fast path");
        return Ok(GamutMapReport { rgb, loss: 0.0, iterations: 0, converged: true });
    }

    let target = rgb_to_jab(rgb, vc);
    if !Vec3::from(target).is_finite() {
        return Err(ColorError::InvalidValue(format!(
            "RGB {:?} has no finite appearance",
            rgb.to_array()
        )));
    }

    let start = rgb.clamp01();
    if target.j <= 0.0 {
        debug!(r = rgb.x, g = rgb.y, b = rgb.z, "no positive achromatic response, clamping");
        return Ok(GamutMapReport {
            rgb: start,
            loss: rgb_to_jab(start, vc).distance_squared(target),
            iterations: 0,
            converged: true,
        });
    }

    Ok(optimize(target, start, vc, options))
}

/// Finds the point of `[0, 1]^3` closest to `target` in CAM02-UCS, starting
/// from `start` clamped to the cube.
///
/// Unlike [`map_to_gamut_with`] the target need not be the appearance of any
/// RGB triplet, which keeps correlates that the inverse model cannot
/// represent usable as a target.
///
/// # Errors
///
/// [`ColorError::InvalidValue`] for a non-finite target or start.
pub fn map_jab_to_gamut(
    target: Jab,
    start: Vec3,
    vc: &ViewingConditions,
    options: &GamutMapOptions,
) -> ColorResult<GamutMapReport> {
    if !Vec3::from(target).is_finite() {
        return Err(ColorError::InvalidValue(format!("non-finite target {:?}", target)));
    }
    if !start.is_finite() {
        return Err(ColorError::InvalidValue(format!("non-finite start {:?}", start.to_array())));
    }
    options.validate()?;

    Ok(optimize(target, start.clamp01(), vc, options))
}

fn optimize(
    target: Jab,
    start: Vec3,
    vc: &ViewingConditions,
    options: &GamutMapOptions,
) -> GamutMapReport {
    trace!(
        j = target.j,
        a = target.a,
        b = target.b,
        method = %options.method,
        "mapping into gamut"
    );

    let objective = Objective::new(target, vc, options.gradient_step);
    let solution = match options.method {
        Method::Lbfgsb => lbfgsb::minimize(&objective, start, options),
        Method::ProjectedGradient => first_order::projected_gradient(&objective, start, options),
        Method::BarzilaiBorwein => first_order::barzilai_borwein(&objective, start, options),
        Method::AdaGrad => first_order::adagrad(&objective, start, options),
    };

    if !solution.converged {
        warn!(
            method = %options.method,
            iterations = solution.iterations,
            loss = solution.loss,
            "gamut mapping did not converge, using best point found"
        );
    }

    GamutMapReport {
        rgb: solution.x.clamp01(),
        loss: solution.loss,
        iterations: solution.iterations,
        converged: solution.converged,
    }
}

/// Maps every color independently, in parallel. Output order matches input.
pub fn map_batch_to_gamut(
    colors: &[Vec3],
    vc: &ViewingConditions,
    options: &GamutMapOptions,
) -> Vec<ColorResult<Vec3>> {
    colors
        .par_iter()
        .map(|&rgb| map_to_gamut_with(rgb, vc, options).map(|r| r.rgb))
        .collect()
}
