//! bgx - translate colors between viewing backgrounds
//!
//! Re-renders foreground colors so they keep their appearance when moved
//! between dark, neutral and light backgrounds.

use anyhow::{Context, Result};
use bgx_color::{Background, Method};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod color_fmt;
mod commands;

use color_fmt::OutputFormat;

#[derive(Parser)]
#[command(name = "bgx")]
#[command(author, version, about = "Translate colors between viewing backgrounds")]
#[command(long_about = "
Translates color schemes between dark, neutral and light backgrounds using
the CIECAM02 color appearance model.

Examples:
  bgx translate '#ffcc00' --src-bg dark --dst-bg light
  bgx translate '#ccc' 'rgb(130, 12, 24)' --j-fac 0.9 --output-format decimal
  bgx gamut 1.2,0.4,-0.1 --bg light --method bb
  bgx conditions
  bgx -vv translate '#123456' --log bgx.log
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate colors from one background to another
    #[command(visible_alias = "t")]
    Translate(TranslateArgs),

    /// Map raw RGB triplets into the displayable gamut
    #[command(visible_alias = "g")]
    Gamut(GamutArgs),

    /// Show the resolved viewing-condition presets
    Conditions,
}

/// Gamut mapper settings shared by subcommands.
#[derive(Args, Clone, Copy)]
struct OptimizerArgs {
    /// Gamut mapping optimizer: lbfgsb, grad, bb, adagrad
    #[arg(long, default_value = "lbfgsb")]
    method: Method,

    /// Optimizer iteration ceiling
    #[arg(long, default_value = "200")]
    max_iter: usize,
}

impl OptimizerArgs {
    fn options(self) -> bgx_color::GamutMapOptions {
        bgx_color::GamutMapOptions {
            max_iterations: self.max_iter,
            ..bgx_color::GamutMapOptions::for_method(self.method)
        }
    }
}

#[derive(Args)]
struct TranslateArgs {
    /// Colors to translate, e.g. '#ffffff' or 'rgb(255, 255, 255)'
    #[arg(required = true)]
    colors: Vec<String>,

    /// Background the input colors were designed for
    #[arg(long, default_value = "neutral")]
    src_bg: Background,

    /// Background to translate the colors to
    #[arg(long, default_value = "neutral")]
    dst_bg: Background,

    /// Scale output lightness by this factor
    #[arg(long, default_value = "1.0")]
    j_fac: f64,

    /// Scale output colourfulness by this factor
    #[arg(long, default_value = "1.0")]
    m_fac: f64,

    /// Output format
    #[arg(long, value_enum, default_value = "hex")]
    output_format: OutputFormat,

    #[command(flatten)]
    optimizer: OptimizerArgs,
}

#[derive(Args)]
struct GamutArgs {
    /// RGB triplets as comma-separated floats, e.g. 1.2,0.4,-0.1
    #[arg(required = true, allow_hyphen_values = true)]
    colors: Vec<String>,

    /// Background whose viewing conditions define the distance
    #[arg(long, default_value = "neutral")]
    bg: Background,

    #[command(flatten)]
    optimizer: OptimizerArgs,
}

fn init_logging(verbose: u8, log: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_ref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Translate(args) => commands::translate::run(args),
        Commands::Gamut(args) => commands::gamut::run(args),
        Commands::Conditions => commands::conditions::run(),
    }
}
