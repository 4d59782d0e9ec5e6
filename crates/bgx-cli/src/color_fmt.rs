//! Color string parsing and formatting.
//!
//! Accepted inputs:
//! - `#rgb`, `#rrggbb` (the `#` is optional)
//! - `rgb(r, g, b)` or `r, g, b` with 0-255 components
//!
//! Raw float triplets for the `gamut` subcommand are parsed by
//! [`parse_triplet`].

use anyhow::{Context, Result, bail};
use bgx_color::math::Vec3;
use clap::ValueEnum;

/// Output color notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `#rrggbb`
    Hex,
    /// `rgb(r, g, b)`
    Decimal,
}

/// Parses a hex color (`#ccc` or `#12ab34`) into [0, 1] components.
pub fn parse_hex(s: &str) -> Result<Vec3> {
    let digits = s.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => bail!("Could not parse hex color: {:?}", s),
    };

    let mut rgb = Vec3::ZERO;
    for i in 0..3 {
        let byte = expanded
            .get(i * 2..i * 2 + 2)
            .with_context(|| format!("Could not parse hex color: {:?}", s))?;
        let v = u8::from_str_radix(byte, 16)
            .with_context(|| format!("Invalid hex digits {:?} in {:?}", byte, s))?;
        rgb[i] = v as f64 / 255.0;
    }
    Ok(rgb)
}

/// First run of digits and dots in `s`, e.g. `"rgb(130"` -> `"130"`.
fn number_in(s: &str) -> Option<&str> {
    let is_num = |c: char| c.is_ascii_digit() || c == '.';
    let start = s.find(is_num)?;
    let rest = &s[start..];
    let end = rest.find(|c: char| !is_num(c)).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Parses a hex or decimal color string into [0, 1] components.
pub fn parse_color(s: &str) -> Result<Vec3> {
    let parts: Vec<&str> = s.split(',').collect();
    match parts.len() {
        1 => parse_hex(s),
        3 => {
            let mut rgb = Vec3::ZERO;
            for (i, part) in parts.iter().enumerate() {
                let num = number_in(part)
                    .with_context(|| format!("Could not parse decimal color: {:?}", s))?;
                let v: f64 = num
                    .parse()
                    .with_context(|| format!("Invalid component {:?} in {:?}", num, s))?;
                rgb[i] = v / 255.0;
            }
            Ok(rgb)
        }
        _ => bail!("Could not parse decimal color: {:?}", s),
    }
}

/// Parses `r,g,b` floats, which may lie outside [0, 1].
pub fn parse_triplet(s: &str) -> Result<Vec3> {
    let values = s
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid component {:?} in {:?}", p.trim(), s))
        })
        .collect::<Result<Vec<f64>>>()?;
    match values.as_slice() {
        &[r, g, b] => Ok(Vec3::new(r, g, b)),
        _ => bail!("Expected three comma-separated values, got {:?}", s),
    }
}

/// Rounds [0, 1] components to 0-255 integers.
fn to_bytes(rgb: Vec3) -> [u8; 3] {
    rgb.to_array().map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Formats a color in the requested notation.
pub fn format_color(rgb: Vec3, format: OutputFormat) -> String {
    let [r, g, b] = to_bytes(rgb);
    match format {
        OutputFormat::Hex => format!("#{:02x}{:02x}{:02x}", r, g, b),
        OutputFormat::Decimal => format!("rgb({}, {}, {})", r, g, b),
    }
}
