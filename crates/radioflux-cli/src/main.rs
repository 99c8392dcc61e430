mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use radioflux_core::resolve::ConstructionMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "radioflux", about = "Measure fluxes from radio FITS images")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure region fluxes in one or more FITS files
    Measure(commands::measure::MeasureArgs),
    /// ds9 analysis plugin: read file and regions from stdin
    Ds9(commands::ds9::Ds9Args),
    /// Show beam, units and channel frequencies of a FITS image
    Info(commands::info::InfoArgs),
    /// Print a default measurement config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The ds9 plugin shows the beam report in its output window.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if matches!(cli.command, Commands::Ds9(_)) {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.verbose {
        ConstructionMode::Verbose
    } else {
        ConstructionMode::Normal
    };

    match &cli.command {
        Commands::Measure(args) => commands::measure::run(args, mode),
        Commands::Ds9(args) => commands::ds9::run(args),
        Commands::Info(args) => commands::info::run(args, mode),
        Commands::Config(args) => commands::config::run(args),
    }
}
