//! Gamut mapping command

use crate::GamutArgs;
use crate::color_fmt::parse_triplet;
use anyhow::Result;
use bgx_color::map_to_gamut_with;
use bgx_color::math::Vec3;
use rayon::prelude::*;
use tracing::trace;

pub fn run(args: GamutArgs) -> Result<()> {
    trace!(bg = %args.bg, method = %args.optimizer.method, "gamut::run");

    let colors = args
        .colors
        .iter()
        .map(|s| parse_triplet(s))
        .collect::<Result<Vec<Vec3>>>()?;

    let vc = args.bg.conditions()?;
    let options = args.optimizer.options();
    let results: Vec<_> = colors
        .par_iter()
        .map(|&rgb| map_to_gamut_with(rgb, &vc, &options))
        .collect();

    super::report(&args.colors, results, |input, report| {
        println!(
            "{} -> {:.6},{:.6},{:.6}  loss={:.6e} iter={}{}",
            input,
            report.rgb.x,
            report.rgb.y,
            report.rgb.z,
            report.loss,
            report.iterations,
            if report.converged { "" } else { " (not converged)" }
        );
    })
}
