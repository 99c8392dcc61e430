use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use radioflux_core::config::FluxConfig;
use radioflux_core::consts::DEFAULT_FOREGROUND_REGION;
use radioflux_core::flux::{flux_for_files, FluxRequest};
use radioflux_core::resolve::ConstructionMode;

use crate::output::record_lines;

#[derive(Args)]
pub struct MeasureArgs {
    /// FITS files to process
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Measurement config file (TOML). Replaces the region and mode flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Foreground region file (or literal region text)
    #[arg(
        short,
        long,
        default_value = DEFAULT_FOREGROUND_REGION,
        conflicts_with = "config"
    )]
    pub foreground: String,

    /// Background region file (or literal region text)
    #[arg(short, long, conflicts_with = "config")]
    pub background: Option<String>,

    /// Break a composite region into individual regions
    #[arg(short, long, conflicts_with = "config")]
    pub individual: bool,

    /// Subtract background
    #[arg(short, long, conflicts_with = "config")]
    pub subtract: bool,

    /// Skip files that fail instead of stopping
    #[arg(long, conflicts_with = "config")]
    pub keep_going: bool,
}

pub fn run(args: &MeasureArgs, mode: ConstructionMode) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid measurement config")?
    } else {
        build_config_from_args(args)
    };

    let request = FluxRequest::from_config(&config, mode)?;
    let summary = flux_for_files(&args.files, &request, |record| {
        for line in record_lines(record) {
            println!("{line}");
        }
    })?;

    if summary.failed > 0 {
        eprintln!(
            "{} of {} files failed",
            summary.failed,
            summary.processed + summary.failed
        );
    }
    Ok(())
}

fn build_config_from_args(args: &MeasureArgs) -> FluxConfig {
    FluxConfig {
        foreground: args.foreground.clone(),
        background: args.background.clone(),
        individual: args.individual,
        subtract_background: args.subtract,
        keep_going: args.keep_going,
    }
}
