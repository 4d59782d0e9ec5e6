//! Projected L-BFGS for box constraints.
//!
//! Variables sitting on a bound with the gradient pushing outward are frozen
//! for the iteration. The quasi-Newton direction is computed over the free
//! variables with the two-loop recursion, then a backtracking Armijo search
//! runs along the projected path `P(x + alpha d)`.

use std::collections::VecDeque;

use bgx_math::Vec3;
use tracing::debug;

use super::{GamutMapOptions, Objective, Solution};

/// Sufficient-decrease constant.
const ARMIJO: f64 = 1e-4;
/// Backtracking steps before the line search gives up.
const MAX_BACKTRACKS: usize = 40;
/// Relative decrease treated as stationary (scipy's `factr = 1e7`).
const FTOL: f64 = 1e7 * f64::EPSILON;

/// One stored correction pair `(s, y, 1 / s.y)`.
type Correction = (Vec3, Vec3, f64);

/// Projected gradient `P(x - g) - x`.
#[inline]
fn projected_gradient(x: Vec3, g: Vec3) -> Vec3 {
    (x - g).clamp01() - x
}

/// 1.0 for free variables, 0.0 for variables held at a bound.
fn free_mask(x: Vec3, g: Vec3) -> Vec3 {
    let mut mask = Vec3::ONE;
    for i in 0..3 {
        if (x[i] <= 0.0 && g[i] > 0.0) || (x[i] >= 1.0 && g[i] < 0.0) {
            mask[i] = 0.0;
        }
    }
    mask
}

/// Two-loop recursion: approximates `H * q` from the stored corrections.
fn two_loop(q: Vec3, history: &VecDeque<Correction>) -> Vec3 {
    let mut q = q;
    let mut alphas = Vec::with_capacity(history.len());
    for &(s, y, rho) in history.iter().rev() {
        let a = rho * s.dot(q);
        q = q - y * a;
        alphas.push(a);
    }

    let gamma = history
        .back()
        .map_or(1.0, |&(s, y, _)| s.dot(y) / y.length_squared());
    let mut r = q * gamma;

    for (&(s, y, rho), &a) in history.iter().zip(alphas.iter().rev()) {
        let b = rho * y.dot(r);
        r = r + s * (a - b);
    }
    r
}

pub(super) fn minimize(obj: &Objective<'_>, start: Vec3, opts: &GamutMapOptions) -> Solution {
    let mut x = start.clamp01();
    let mut f = obj.loss(x);
    let mut g = obj.gradient(x, f);
    let mut history: VecDeque<Correction> = VecDeque::with_capacity(opts.history);

    for iter in 0..opts.max_iterations {
        if projected_gradient(x, g).abs().max_element() < opts.tolerance {
            return Solution { x, loss: f, iterations: iter, converged: true };
        }

        let free = free_mask(x, g);
        let mut d = -(two_loop(g * free, &history) * free);
        if d.dot(g) >= 0.0 {
            // Curvature pairs went stale, restart from steepest descent
            history.clear();
            d = -(g * free);
        }

        let mut alpha = if history.is_empty() {
            1.0f64.min(1.0 / d.abs().max_element())
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let x_new = (x + d * alpha).clamp01();
            let step = x_new - x;
            if step.abs().max_element() == 0.0 {
                break;
            }
            let f_new = obj.loss(x_new);
            if f_new <= f + ARMIJO * g.dot(step) {
                accepted = Some((x_new, f_new));
                break;
            }
            alpha *= 0.5;
        }

        let Some((x_new, f_new)) = accepted else {
            // No descent left at finite-difference resolution
            debug!(iter, loss = f, "L-BFGS line search stalled");
            return Solution { x, loss: f, iterations: iter + 1, converged: true };
        };

        let g_new = obj.gradient(x_new, f_new);
        let s = x_new - x;
        let y = g_new - g;
        let sy = s.dot(y);
        if opts.history > 0 && sy > f64::EPSILON * y.length_squared() {
            if history.len() == opts.history {
                history.pop_front();
            }
            history.push_back((s, y, 1.0 / sy));
        }

        let decrease = (f - f_new) / f.abs().max(f_new.abs()).max(1.0);
        x = x_new;
        f = f_new;
        g = g_new;

        if decrease <= FTOL {
            return Solution { x, loss: f, iterations: iter + 1, converged: true };
        }
    }

    Solution { x, loss: f, iterations: opts.max_iterations, converged: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_mask() {
        let x = Vec3::new(0.0, 1.0, 0.5);
        let g = Vec3::new(1.0, -1.0, 1.0);
        assert_eq!(free_mask(x, g), Vec3::new(0.0, 0.0, 1.0));
        // Gradient pointing inward frees the bound variable
        assert_eq!(free_mask(x, -g), Vec3::ONE);
    }

    #[test]
    fn test_projected_gradient_zero_at_bound_minimum() {
        let x = Vec3::new(0.0, 1.0, 0.5);
        let g = Vec3::new(3.0, -2.0, 0.0);
        assert_eq!(projected_gradient(x, g), Vec3::ZERO);
    }

    #[test]
    fn test_two_loop_without_history_is_identity() {
        let q = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(two_loop(q, &VecDeque::new()), q);
    }

    #[test]
    fn test_two_loop_recovers_quadratic_curvature() {
        // f = x^2 + 2y^2 + 4z^2, exact pairs along each axis
        let hess = Vec3::new(2.0, 4.0, 8.0);
        let mut history = VecDeque::new();
        for i in 0..3 {
            let mut s = Vec3::ZERO;
            s[i] = 1.0;
            let y = s * hess;
            history.push_back((s, y, 1.0 / s.dot(y)));
        }
        let g = Vec3::new(2.0, 4.0, 8.0);
        let d = two_loop(g, &history);
        for i in 0..3 {
            assert!((d[i] - 1.0).abs() < 1e-12, "d = {:?}", d);
        }
    }
}
