use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use radioflux_core::radiomap::RadioMap;
use radioflux_core::resolve::{BeamSource, ConstructionMode};

use crate::output::{card_line, format_g, Styles};

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS file
    pub file: PathBuf,

    /// Also print every primary header card
    #[arg(long)]
    pub header: bool,
}

pub fn run(args: &InfoArgs, mode: ConstructionMode) -> Result<()> {
    let map = RadioMap::open(&args.file, mode)
        .with_context(|| format!("Failed to build map from {}", args.file.display()))?;
    let s = Styles::new();

    let (rows, cols) = map.plane_shape();
    let beam = map.beam();
    let source = match beam.source {
        BeamSource::Keywords(major, minor) => format!("{major}/{minor}"),
        BeamSource::History => "HISTORY".to_string(),
    };

    let scale = map.pixel_scale();

    println!("{}", s.title.apply_to(args.file.display()));
    if let Some(object) = map.header().get_str("OBJECT") {
        println!("  {:<14}{}", s.label.apply_to("Object"), object);
    }
    println!("  {:<14}{}", s.label.apply_to("Units"), map.units().unwrap_or("unknown"));
    println!("  {:<14}{}x{}", s.label.apply_to("Plane size"), cols, rows);
    println!(
        "  {:<14}{} x {} arcsec",
        s.label.apply_to("Pixel size"),
        format_g(scale.cd1().abs() * 3600.0),
        format_g(scale.cd2().abs() * 3600.0)
    );
    println!(
        "  {:<14}{} x {} deg ({})",
        s.label.apply_to("Beam"),
        beam.major_deg,
        beam.minor_deg,
        source
    );
    println!(
        "  {:<14}{:.4} x {:.4} pixels",
        s.label.apply_to("Beam (pix)"),
        map.beam_major_pixels(),
        map.beam_minor_pixels()
    );
    println!(
        "  {:<14}{:.4} pixels",
        s.label.apply_to("Beam area"),
        s.value.apply_to(map.beam_area_pixels())
    );
    println!("  {:<14}{}", s.label.apply_to("Cube"), map.is_cube());
    println!("  {:<14}{}", s.label.apply_to("Channels"), map.channel_count());
    for (i, frequency) in map.frequencies().iter().enumerate() {
        let text = if *frequency == 0.0 {
            "unknown".to_string()
        } else {
            format!("{} Hz", format_g(*frequency))
        };
        println!("    {:>4}  {}", i, text);
    }

    if args.header {
        println!();
        for card in map.header().cards() {
            println!("{}", card_line(card));
        }
    }

    Ok(())
}
