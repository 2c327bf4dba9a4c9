//! Mission → report → table / plot pipeline.

use crate::config::Config;
use crate::render;
use anyhow::{Context, Result};
use elev_core::{
    build_report, build_route, read_mission, write_profile, write_table, ElevationSource,
    PlotScript, Report, SequenceError, Termination,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Table (and plot, if requested) written
    Written,
    /// Fewer than two usable waypoints; nothing written
    Truncated,
}

/// Run the full pipeline against `source`.
///
/// Intermediate files live in a scratch directory that is removed when this
/// function returns, on success or error.
pub fn run<S: ElevationSource>(config: &Config, source: &S) -> Result<Outcome> {
    let items = read_mission(&config.mission_file)
        .with_context(|| format!("reading {}", config.mission_file.display()))?;

    let seq = match build_route(&items, config.home) {
        Ok(seq) => seq,
        Err(SequenceError::Truncated { termination, len }) => {
            tracing::debug!("Truncated with {} waypoint(s) ({:?})", len, termination);
            return Ok(Outcome::Truncated);
        }
    };
    match seq.termination {
        Termination::TruncatedNoHome => {
            tracing::warn!("RTH without a home location, route ends before it")
        }
        Termination::StoppedAtHold => {
            tracing::info!("Route ends at unlimited position hold")
        }
        Termination::Completed => {}
    }

    let plotting = config.plot_file.is_some();
    let report = build_report(&seq.route, source, plotting);
    let scratch = if plotting {
        Some(
            tempfile::Builder::new()
                .prefix(".mi-")
                .tempdir_in(&config.scratch_dir)
                .context("creating scratch directory")?,
        )
    } else {
        None
    };

    let table_path = match (&config.output_file, &scratch) {
        (Some(path), _) => {
            write_table_file(&report, path)?;
            tracing::info!("Wrote {}", path.display());
            Some(path.clone())
        }
        (None, Some(scratch)) => {
            let path = scratch.path().join("mission.csv");
            write_table_file(&report, &path)?;
            Some(path)
        }
        (None, None) => {
            write_table(&report, io::stdout().lock()).context("writing table")?;
            None
        }
    };

    if let (Some(plot_file), Some(scratch), Some(table_path)) =
        (&config.plot_file, &scratch, table_path)
    {
        plot(config, &report, plot_file, scratch, table_path)?;
        tracing::info!("Wrote {}", plot_file.display());
    }

    Ok(Outcome::Written)
}

fn write_table_file(report: &Report, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_table(report, BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))
}

fn plot(
    config: &Config,
    report: &Report,
    plot_file: &Path,
    scratch: &TempDir,
    table_path: PathBuf,
) -> Result<()> {
    let profile_path = match &report.profile {
        Some(profile) => {
            let path = scratch.path().join("profile.csv");
            let file = File::create(&path).context("creating profile data")?;
            write_profile(profile, BufWriter::new(file)).context("writing profile data")?;
            Some(path)
        }
        None => None,
    };

    let script = PlotScript::new(report, plot_file, table_path, profile_path);
    let script_path = scratch.path().join("mission.plt");
    std::fs::write(&script_path, script.to_string()).context("writing plot script")?;

    render::render(&config.gnuplot, &script_path).context("plotting failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use elev_client::ElevationConfig;
    use elev_core::{Coordinate, ElevationError};

    const MISSION: &str = r#"<MISSION>
  <MISSIONITEM no="1" action="WAYPOINT" lat="51.01" lon="-1.0" alt="50" parameter1="0" parameter2="0" parameter3="0"/>
  <MISSIONITEM no="2" action="RTH" lat="0" lon="0" alt="0" parameter1="0" parameter2="0" parameter3="0"/>
</MISSION>"#;

    struct Flat;

    impl ElevationSource for Flat {
        fn fetch_list(&self, points: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
            Ok(vec![42.0; points.len()])
        }

        fn fetch_polyline(
            &self,
            _points: &[Coordinate],
            samples: usize,
        ) -> Result<Vec<f64>, ElevationError> {
            Ok(vec![42.0; samples + 1])
        }
    }

    fn config(dir: &Path, home: Option<Coordinate>) -> Config {
        let mission_file = dir.join("mission.xml");
        std::fs::write(&mission_file, MISSION).unwrap();
        let scratch_dir = dir.join("scratch");
        std::fs::create_dir(&scratch_dir).unwrap();
        Config {
            mission_file,
            home,
            plot_file: None,
            output_file: None,
            gnuplot: "true".to_string(),
            scratch_dir,
            elevation: ElevationConfig::default(),
        }
    }

    fn scratch_is_empty(config: &Config) -> bool {
        std::fs::read_dir(&config.scratch_dir).unwrap().next().is_none()
    }

    #[test]
    fn writes_table_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), Some(Coordinate::new(51.0, -1.0)));
        let output = dir.path().join("out.csv");
        config.output_file = Some(output.clone());

        assert_eq!(run(&config, &Flat).unwrap(), Outcome::Written);
        let text = std::fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0\tHOME\t"));
        assert!(lines[3].starts_with("2\tRTH\t51.0\t-1.0\t0\t"));
        assert!(lines[2].ends_with("\t92\t42"));
        assert!(scratch_is_empty(&config));
    }

    #[test]
    #[cfg(unix)]
    fn plotting_cleans_up_scratch_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), Some(Coordinate::new(51.0, -1.0)));
        config.plot_file = Some(dir.path().join("mission.svg"));

        assert_eq!(run(&config, &Flat).unwrap(), Outcome::Written);
        assert!(scratch_is_empty(&config));
    }

    #[test]
    #[cfg(unix)]
    fn renderer_failure_keeps_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), Some(Coordinate::new(51.0, -1.0)));
        let output = dir.path().join("out.csv");
        config.output_file = Some(output.clone());
        config.plot_file = Some(dir.path().join("mission.svg"));
        config.gnuplot = "false".to_string();

        let err = run(&config, &Flat).unwrap_err();
        assert!(format!("{err:#}").contains("plotting failed"));
        assert!(output.exists());
        assert!(scratch_is_empty(&config));
    }

    #[test]
    fn rth_without_home_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), None);
        let output = dir.path().join("out.csv");
        config.output_file = Some(output.clone());

        assert_eq!(run(&config, &Flat).unwrap(), Outcome::Truncated);
        assert!(!output.exists());
    }

    #[test]
    fn missing_mission_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), None);
        config.mission_file = dir.path().join("nope.xml");
        let err = run(&config, &Flat).unwrap_err();
        assert!(format!("{err:#}").contains("nope.xml"));
    }
}
