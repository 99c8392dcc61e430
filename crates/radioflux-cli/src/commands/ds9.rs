use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use radioflux_core::config::FluxConfig;
use radioflux_core::flux::{measure_map, FluxRequest};
use radioflux_core::radiomap::RadioMap;
use radioflux_core::resolve::ConstructionMode;

use crate::output::{format_g, Styles};

#[derive(Args)]
pub struct Ds9Args {
    /// Subtract background
    #[arg(short, long)]
    pub subtract: bool,
}

/// Read image path, foreground and background region text from three
/// stdin lines, as ds9 passes them to an analysis task.
pub fn run(args: &Ds9Args) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut next_line = || -> Result<String> {
        Ok(lines
            .next()
            .transpose()
            .context("Failed to read from stdin")?
            .unwrap_or_default()
            .trim_end()
            .to_string())
    };
    let filename = PathBuf::from(next_line()?);
    let fg_region = next_line()?;
    let bg_region = next_line()?;

    let s = Styles::new();
    println!("{}", "-".repeat(61));
    println!("{} {}", s.label.apply_to("Filename is"), filename.display());
    println!("{} <<{}>>", s.label.apply_to("FG region is"), fg_region);
    println!("{} <<{}>>", s.label.apply_to("BG region is"), bg_region);

    let config = FluxConfig {
        foreground: fg_region,
        background: Some(bg_region).filter(|r| !r.is_empty()),
        individual: false,
        subtract_background: args.subtract,
        keep_going: false,
    };
    let request = FluxRequest::from_config(&config, ConstructionMode::Verbose)?;

    let map = match RadioMap::open(&filename, ConstructionMode::Verbose) {
        Ok(map) => map,
        Err(e) => {
            println!("{} {}", s.error.apply_to("FATAL ERROR:"), e);
            return Ok(());
        }
    };

    let measurement = measure_map(&filename, map, &request)?;
    let frequencies = measurement.map.frequencies();

    if let Some(ref bg) = measurement.background {
        println!("Pixels in background region {}", bg.pixel_count);
        for (i, frequency) in frequencies.iter().enumerate() {
            println!(
                "{} Hz Background rms is {:.6} Jy/beam",
                format_g(*frequency),
                bg.rms[i]
            );
            println!("              Background mean is {} Jy/beam", bg.mean[i]);
        }
    }

    for record in &measurement.records {
        println!("Pixels in foreground region {}", record.pixel_count);
        for channel in &record.channels {
            let flux = match channel.error {
                Some(error) => format!("{:.6} +/- {:.6}", channel.flux, error),
                None => format!("{:.6}", channel.flux),
            };
            println!(
                "{} Hz Region flux is {} Jy",
                format_g(channel.frequency),
                s.value.apply_to(flux)
            );
        }
    }

    Ok(())
}
