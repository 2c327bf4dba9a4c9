//! plot-elevations - plot an iNav / MultiWii XML mission against terrain elevation.
//!
//! Elevation data comes from the Bing Maps elevation service, so a network
//! connection and an API key (`ELEVATION_API_KEY`) are needed. Supply a home
//! location (`--home` or `MWP_HOME`) so that home -> WP1 and RTH legs can be
//! modelled.
//!
//! Usage:
//!   plot-elevations [--plotfile FILE] [--home LAT,LON] [--output FILE] MISSION

mod config;
mod pipeline;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use elev_client::BingElevationClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::pipeline::Outcome;

#[derive(Parser, Debug)]
#[command(
    name = "plot-elevations",
    version,
    about = "Plot a mission file against terrain elevation",
    long_about = "Plots an iNav / MultiWii XML mission file against terrain elevation data.\n\n\
        Graphical output is an SVG file and requires gnuplot. The table can also be \
        written to a file. If neither a plot file nor an output file is given, the \
        table is written to standard output.\n\n\
        The environment variable MWP_HOME, if defined, is consulted for a home \
        location (--home takes precedence)."
)]
struct Args {
    /// Mission file (XML)
    mission_file: PathBuf,

    /// Plot file (SVG)
    #[arg(short, long, value_name = "FILE")]
    plotfile: Option<PathBuf>,

    /// Home location as lat,lon
    #[arg(short = 'H', long, value_name = "LOCATION", allow_hyphen_values = true)]
    home: Option<String>,

    /// Output file (tab separated)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "elev_cli=debug,elev_core=debug,elev_client=debug"
    } else {
        "warn,elev_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(args: Args) -> Result<Outcome> {
    let config = Config::resolve(
        args.mission_file,
        args.home.as_deref(),
        args.plotfile,
        args.output,
    )?;
    if let Some(home) = config.home {
        tracing::debug!("Home location {:.6},{:.6}", home.lat, home.lon);
    }
    if config.elevation.api_key.is_empty() {
        tracing::warn!("No ELEVATION_API_KEY set, elevation requests will likely be refused");
    }

    let client = BingElevationClient::new(&config.elevation).context("creating elevation client")?;
    pipeline::run(&config, &client)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(Outcome::Written) => ExitCode::SUCCESS,
        Ok(Outcome::Truncated) => {
            println!("Truncated mission");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
