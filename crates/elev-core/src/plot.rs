//! Gnuplot script generation for the elevation plot.

use crate::report::{
    Report, PROFILE_DISTANCE_COLUMN, PROFILE_ELEVATION_COLUMN, TABLE_AMSL_COLUMN,
    TABLE_DISTANCE_COLUMN,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// A labelled x-axis tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub label: String,
    pub distance_m: i64,
}

/// Declarative plot description, rendered as a gnuplot script via `Display`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotScript {
    pub ticks: Vec<Tick>,
    /// Y-axis floor and terrain fill baseline
    pub floor: Option<f64>,
    pub output: PathBuf,
    pub table: PathBuf,
    /// Terrain profile data; the terrain series is omitted when None
    pub profile: Option<PathBuf>,
}

/// Append `.svg` to a plot path unless it already ends with it.
pub fn svg_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.to_string_lossy().ends_with(".svg") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".svg");
        PathBuf::from(name)
    }
}

impl PlotScript {
    pub fn new(
        report: &Report,
        output: impl Into<PathBuf>,
        table: impl Into<PathBuf>,
        profile: Option<PathBuf>,
    ) -> Self {
        let ticks = report
            .rows
            .iter()
            .map(|row| Tick {
                label: row.label.clone(),
                distance_m: row.tick_distance(),
            })
            .collect();
        Self {
            ticks,
            floor: report.min_elevation,
            output: output.into(),
            table: table.into(),
            profile,
        }
    }

    fn distance_tics(&self) -> String {
        self.ticks
            .iter()
            .map(|t| t.distance_m.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn label_tics(&self) -> String {
        self.ticks
            .iter()
            .map(|t| format!("\"{}\" {}", t.label, t.distance_m))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display().to_string().replace('"', "\\\""))
}

impl fmt::Display for PlotScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let floor = self.floor.map(|v| v.to_string()).unwrap_or_default();
        let baseline = self.floor.unwrap_or(0.0);

        writeln!(f, "set bmargin 8")?;
        writeln!(f, "set key top right")?;
        writeln!(f, "set key box")?;
        writeln!(f, "set grid")?;
        writeln!(f, "set xtics ({})", self.distance_tics())?;
        writeln!(f, "set xtics rotate by 45 offset -0.8,-1")?;
        writeln!(f, "set x2tics rotate by 45")?;
        writeln!(f, "set x2tics ({})", self.label_tics())?;
        writeln!(f, "set xlabel \"Distance\"")?;
        writeln!(f, "set bmargin 3")?;
        writeln!(f)?;
        writeln!(f, "set title \"Mission Elevation\"")?;
        writeln!(f, "set ylabel \"Elevation\"")?;
        writeln!(f, "show label")?;
        writeln!(f, "set yrange [ {floor} : ]")?;
        writeln!(f, "set xrange [ 0 : ]")?;
        writeln!(f, "set datafile separator \"\\t\"")?;
        writeln!(f)?;
        writeln!(
            f,
            "set terminal svg enhanced background rgb 'white' font \"Droid Sans,9\" rounded"
        )?;
        writeln!(f, "set output {}", quoted(&self.output))?;
        writeln!(f)?;
        write!(
            f,
            "plot {} using {}:{} t \"Mission\" w lines lt -1 lw 2 lc rgb \"red\"",
            quoted(&self.table),
            TABLE_DISTANCE_COLUMN,
            TABLE_AMSL_COLUMN
        )?;
        if let Some(profile) = &self.profile {
            write!(
                f,
                ", {} using {}:{} t \"Terrain\" w filledcurve y1={} lt -1 lw 2 lc rgb \"green\"",
                quoted(profile),
                PROFILE_DISTANCE_COLUMN,
                PROFILE_ELEVATION_COLUMN,
                baseline
            )?;
        }
        writeln!(f)
    }
}
