//! Run configuration, resolved once from arguments and environment.

use elev_client::ElevationConfig;
use elev_core::{Coordinate, ParseCoordinateError};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Environment fallback for the home location.
pub const HOME_ENV: &str = "MWP_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bad home location: {0}")]
    Home(#[from] ParseCoordinateError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mission_file: PathBuf,
    pub home: Option<Coordinate>,
    /// SVG plot destination (`.svg` appended when missing)
    pub plot_file: Option<PathBuf>,
    /// Table destination; stdout when neither this nor a plot is requested
    pub output_file: Option<PathBuf>,
    pub gnuplot: String,
    /// Where intermediate plot files are created
    pub scratch_dir: PathBuf,
    pub elevation: ElevationConfig,
}

impl Config {
    pub fn resolve(
        mission_file: PathBuf,
        home: Option<&str>,
        plot_file: Option<PathBuf>,
        output_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            mission_file,
            home: resolve_home(home, env::var(HOME_ENV).ok().as_deref())?,
            plot_file: plot_file.map(elev_core::svg_path),
            output_file,
            gnuplot: env::var("GNUPLOT").unwrap_or_else(|_| "gnuplot".to_string()),
            scratch_dir: env::temp_dir(),
            elevation: ElevationConfig::from_env(),
        })
    }
}

/// The explicit setting wins over the environment value. Blank values are
/// treated as unset.
pub fn resolve_home(
    explicit: Option<&str>,
    from_env: Option<&str>,
) -> Result<Option<Coordinate>, ConfigError> {
    fn set(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|s| !s.is_empty())
    }
    match set(explicit).or_else(|| set(from_env)) {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}
