//! CLI command implementations

pub mod conditions;
pub mod gamut;
pub mod translate;

use anyhow::{Result, bail};
use bgx_color::ColorResult;

/// Prints one line per result, then fails if any color failed.
///
/// Failures are reported on stderr alongside the input that caused them so
/// the remaining colors are still printed.
pub fn report<T>(
    inputs: &[String],
    results: Vec<ColorResult<T>>,
    mut print: impl FnMut(&str, T),
) -> Result<()> {
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(value) => print(input, value),
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {}", input, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} colors failed", failed, inputs.len());
    }
    Ok(())
}
