//! Translate command

use crate::TranslateArgs;
use crate::color_fmt::{format_color, parse_color};
use anyhow::Result;
use bgx_color::math::Vec3;
use bgx_color::{Presets, Translator};
use tracing::{debug, info, trace};

pub fn run(args: TranslateArgs) -> Result<()> {
    trace!(src = %args.src_bg, dst = %args.dst_bg, colors = args.colors.len(), "translate::run");

    let colors = args
        .colors
        .iter()
        .map(|s| parse_color(s))
        .collect::<Result<Vec<Vec3>>>()?;

    let presets = Presets::new()?;
    let translator = Translator::new(presets.get(args.src_bg), presets.get(args.dst_bg))
        .factors(args.j_fac, args.m_fac)
        .options(args.optimizer.options());

    debug!(
        j_factor = args.j_fac,
        m_factor = args.m_fac,
        method = %args.optimizer.method,
        "translator ready"
    );

    let results = translator.translate_batch(&colors);
    super::report(&args.colors, results, |_, rgb| {
        println!("{}", format_color(rgb, args.output_format));
    })?;

    info!(count = colors.len(), "translation complete");
    Ok(())
}
