//! First-order projected methods.
//!
//! All three stop when the mean absolute change of `x` over one iteration
//! drops below the tolerance, and return the best point visited.

use bgx_math::Vec3;

use super::{GamutMapOptions, Objective, Solution};

/// Initial step of the halving search.
const HALVING_START: f64 = 10.0;
/// Smallest step the halving search tries.
const HALVING_MIN: f64 = 1e-12;
/// Barzilai-Borwein step before curvature is known.
const BB_INITIAL: f64 = 1e-3;
/// AdaGrad learning rate.
const ADAGRAD_RATE: f64 = 0.25;
/// AdaGrad accumulator seed.
const ADAGRAD_SEED: f64 = 1e-8;

/// Lowest-loss point seen so far.
struct Best {
    x: Vec3,
    loss: f64,
}

impl Best {
    fn offer(&mut self, x: Vec3, loss: f64) {
        if loss < self.loss {
            self.x = x;
            self.loss = loss;
        }
    }

    fn finish(self, iterations: usize, converged: bool) -> Solution {
        Solution { x: self.x, loss: self.loss, iterations, converged }
    }
}

#[inline]
fn mean_step(a: Vec3, b: Vec3) -> f64 {
    (a - b).abs().mean()
}

/// Projected steepest descent. The step starts at 10 and halves until the
/// loss does not increase.
pub(super) fn projected_gradient(
    obj: &Objective<'_>,
    start: Vec3,
    opts: &GamutMapOptions,
) -> Solution {
    let mut x = start.clamp01();
    let mut f = obj.loss(x);

    for iter in 0..opts.max_iterations {
        let g = obj.gradient(x, f);

        let mut step = HALVING_START;
        let mut next = (x, f);
        while step > HALVING_MIN {
            step *= 0.5;
            let candidate = (x - g * step).clamp01();
            let loss = obj.loss(candidate);
            if loss <= f {
                next = (candidate, loss);
                break;
            }
        }

        let moved = mean_step(next.0, x);
        (x, f) = next;
        if moved < opts.tolerance {
            return Solution { x, loss: f, iterations: iter + 1, converged: true };
        }
    }

    Solution { x, loss: f, iterations: opts.max_iterations, converged: false }
}

/// Projected gradient with the Barzilai-Borwein step `s.s / s.y`.
pub(super) fn barzilai_borwein(
    obj: &Objective<'_>,
    start: Vec3,
    opts: &GamutMapOptions,
) -> Solution {
    let mut x = start.clamp01();
    let mut f = obj.loss(x);
    let mut best = Best { x, loss: f };
    let mut last: Option<(Vec3, Vec3)> = None;

    for iter in 0..opts.max_iterations {
        let g = obj.gradient(x, f);
        let step = match last {
            Some((last_x, last_g)) => {
                let s = x - last_x;
                let y = g - last_g;
                let bb = s.length_squared() / s.dot(y);
                if bb.is_finite() && bb > 0.0 { bb } else { BB_INITIAL }
            }
            None => BB_INITIAL,
        };
        last = Some((x, g));

        let x_new = (x - g * step).clamp01();
        let moved = mean_step(x_new, x);
        x = x_new;
        f = obj.loss(x);
        best.offer(x, f);

        if moved < opts.tolerance {
            return best.finish(iter + 1, true);
        }
    }

    best.finish(opts.max_iterations, false)
}

/// Projected AdaGrad.
pub(super) fn adagrad(obj: &Objective<'_>, start: Vec3, opts: &GamutMapOptions) -> Solution {
    let mut x = start.clamp01();
    let mut f = obj.loss(x);
    let mut best = Best { x, loss: f };
    let mut g2 = Vec3::splat(ADAGRAD_SEED);

    for iter in 0..opts.max_iterations {
        let g = obj.gradient(x, f);
        g2 = g2 + g * g;

        let x_new = (x - g * ADAGRAD_RATE / g2.map(f64::sqrt)).clamp01();
        let moved = mean_step(x_new, x);
        x = x_new;
        f = obj.loss(x);
        best.offer(x, f);

        if moved < opts.tolerance {
            return best.finish(iter + 1, true);
        }
    }

    best.finish(opts.max_iterations, false)
}
