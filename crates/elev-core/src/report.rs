//! Report assembly: joins a route with terrain elevations.

use crate::elevation::{ElevationSource, MAX_SAMPLE_COUNT};
use crate::models::{Route, Waypoint};
use serde::Serialize;
use std::io::{self, Write};

/// Target spacing between terrain profile samples, metres.
pub const PROFILE_SPACING_M: f64 = 30.0;

pub const TABLE_HEADER: [&str; 13] = [
    "No",
    "Act",
    "Lat",
    "Lon",
    "Alt",
    "P1",
    "P2",
    "P3",
    "Course",
    "Leg (m)",
    "Total (m)",
    "AMSL",
    "Elevation",
];

/// Column (1-based) of the cumulative distance in the table.
pub const TABLE_DISTANCE_COLUMN: usize = 11;
/// Column (1-based) of the AMSL altitude in the table.
pub const TABLE_AMSL_COLUMN: usize = 12;
/// Columns (1-based) of distance and elevation in the profile file.
pub const PROFILE_DISTANCE_COLUMN: usize = 2;
pub const PROFILE_ELEVATION_COLUMN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub waypoint: Waypoint,
    /// Terrain elevation at the waypoint
    pub elevation_m: Option<f64>,
    /// Mission altitude above mean sea level
    pub amsl_m: Option<f64>,
    /// Plot tick label
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub index: usize,
    pub distance_m: f64,
    pub elevation_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    /// Evenly spaced terrain profile; None when not requested or unavailable
    pub profile: Option<Vec<ProfilePoint>>,
    /// Lowest waypoint terrain elevation, floored to a multiple of 10
    pub min_elevation: Option<f64>,
    pub total_m: f64,
}

/// Number of profile intervals for a route of `total_m` metres.
pub fn profile_sample_count(total_m: f64) -> usize {
    if !total_m.is_finite() || total_m <= 0.0 {
        return 0;
    }
    ((total_m / PROFILE_SPACING_M).floor() as usize).min(MAX_SAMPLE_COUNT)
}

fn floor_to_ten(value: f64) -> f64 {
    (value / 10.0).floor() * 10.0
}

/// Build the report for a route.
///
/// Elevation failures never abort the report: the affected values are left
/// empty and a warning is logged.
pub fn build_report<S: ElevationSource + ?Sized>(
    route: &Route,
    source: &S,
    with_profile: bool,
) -> Report {
    let points = route.coordinates();
    let elevations = match source.fetch_list(&points) {
        Ok(elevations) if elevations.len() == points.len() => Some(elevations),
        Ok(elevations) => {
            tracing::warn!(
                "Elevation list has {} samples for {} waypoints, ignoring",
                elevations.len(),
                points.len()
            );
            None
        }
        Err(err) => {
            tracing::warn!("Waypoint elevations unavailable: {}", err);
            None
        }
    };

    // The first point (home, when known) is the ground reference for relative altitudes.
    let ground = elevations.as_ref().and_then(|e| e.first().copied());

    let rows: Vec<ReportRow> = route
        .waypoints()
        .iter()
        .enumerate()
        .map(|(idx, wp)| {
            let elevation_m = elevations.as_ref().map(|e| e[idx]);
            ReportRow {
                waypoint: wp.clone(),
                elevation_m,
                amsl_m: ground.map(|g| g + f64::from(wp.alt)),
                label: wp.label(),
            }
        })
        .collect();

    let min_elevation = rows
        .iter()
        .filter_map(|row| row.elevation_m)
        .filter(|e| e.is_finite())
        .reduce(f64::min)
        .map(floor_to_ten);

    let total_m = route.total_m();
    let profile = if with_profile {
        build_profile(route, source, total_m)
    } else {
        None
    };

    Report {
        rows,
        profile,
        min_elevation,
        total_m,
    }
}

fn build_profile<S: ElevationSource + ?Sized>(
    route: &Route,
    source: &S,
    total_m: f64,
) -> Option<Vec<ProfilePoint>> {
    let samples = profile_sample_count(total_m);
    if samples == 0 {
        tracing::warn!("Route is too short ({:.0} m) for a terrain profile", total_m);
        return None;
    }

    let elevations = match source.fetch_polyline(&route.coordinates(), samples) {
        Ok(elevations) if elevations.len() == samples + 1 => elevations,
        Ok(elevations) => {
            tracing::warn!(
                "Terrain profile has {} samples, expected {}, ignoring",
                elevations.len(),
                samples + 1
            );
            return None;
        }
        Err(err) => {
            tracing::warn!("Terrain profile unavailable: {}", err);
            return None;
        }
    };

    let step = total_m / samples as f64;
    tracing::debug!("Terrain profile: {} intervals of {:.1} m", samples, step);
    Some(
        elevations
            .into_iter()
            .enumerate()
            .map(|(index, elevation_m)| ProfilePoint {
                index,
                distance_m: step * index as f64,
                elevation_m,
            })
            .collect(),
    )
}

fn fmt_degrees(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportRow {
    /// Table cells, in [`TABLE_HEADER`] order.
    pub fn cells(&self) -> [String; 13] {
        let wp = &self.waypoint;
        [
            wp.no.to_string(),
            wp.action.to_string(),
            fmt_degrees(wp.position.lat),
            fmt_degrees(wp.position.lon),
            wp.alt.to_string(),
            wp.params[0].clone(),
            wp.params[1].clone(),
            wp.params[2].clone(),
            wp.course_deg.map(|c| format!("{c:.1}")).unwrap_or_default(),
            wp.leg_m.map(|d| format!("{d:.0}")).unwrap_or_default(),
            format!("{:.0}", wp.total_m),
            fmt_opt(self.amsl_m),
            fmt_opt(self.elevation_m),
        ]
    }

    /// Cumulative distance truncated to whole metres, as used for plot ticks.
    pub fn tick_distance(&self) -> i64 {
        self.waypoint.total_m.trunc() as i64
    }
}

/// Write the tab separated waypoint table.
pub fn write_table<W: Write>(report: &Report, mut out: W) -> io::Result<()> {
    writeln!(out, "{}", TABLE_HEADER.join("\t"))?;
    for row in &report.rows {
        writeln!(out, "{}", row.cells().join("\t"))?;
    }
    out.flush()
}

/// Write the tab separated terrain profile (`Index Dist Elev`).
pub fn write_profile<W: Write>(profile: &[ProfilePoint], mut out: W) -> io::Result<()> {
    writeln!(out, "Index\tDist\tElev")?;
    for point in profile {
        writeln!(
            out,
            "{}\t{}\t{}",
            point.index,
            point.distance_m.trunc() as i64,
            point.elevation_m
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::ElevationError;
    use crate::models::{Action, Coordinate, MissionItem};
    use crate::sequencer::build_route;
    use std::cell::RefCell;

    /// Returns canned elevations and records requested sample counts.
    struct FixedSource {
        list: Result<Vec<f64>, ElevationError>,
        profile_base: Option<f64>,
        requested: RefCell<Vec<usize>>,
    }

    impl ElevationSource for FixedSource {
        fn fetch_list(&self, _points: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
            self.list.clone()
        }

        fn fetch_polyline(
            &self,
            _points: &[Coordinate],
            samples: usize,
        ) -> Result<Vec<f64>, ElevationError> {
            self.requested.borrow_mut().push(samples);
            match self.profile_base {
                Some(base) => Ok((0..=samples).map(|i| base + i as f64).collect()),
                None => Err(ElevationError::Status(500)),
            }
        }
    }

    fn route() -> Route {
        let items = vec![
            MissionItem::new(1, Action::Waypoint, 51.01, -1.0, 50),
            MissionItem::new(2, Action::Waypoint, 51.02, -1.0, 60),
            MissionItem::new(3, Action::Rth, 0.0, 0.0, 30),
        ];
        build_route(&items, Some(Coordinate::new(51.0, -1.0)))
            .unwrap()
            .route
    }

    #[test]
    fn sample_count_is_capped() {
        assert_eq!(profile_sample_count(0.0), 0);
        assert_eq!(profile_sample_count(29.9), 0);
        assert_eq!(profile_sample_count(95.0), 3);
        assert_eq!(profile_sample_count(30_690.0), 1023);
        assert_eq!(profile_sample_count(500_000.0), MAX_SAMPLE_COUNT);
    }

    #[test]
    fn rows_carry_amsl_and_labels() {
        let source = FixedSource {
            list: Ok(vec![103.0, 117.0, 96.0, 103.0]),
            profile_base: None,
            requested: RefCell::new(Vec::new()),
        };
        let report = build_report(&route(), &source, false);

        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Home", "WP1", "WP2", "RTH"]);

        let amsl: Vec<Option<f64>> = report.rows.iter().map(|r| r.amsl_m).collect();
        assert_eq!(amsl, [Some(103.0), Some(153.0), Some(163.0), Some(103.0)]);
        assert_eq!(report.rows[2].elevation_m, Some(96.0));
        assert_eq!(report.min_elevation, Some(90.0));
        assert!(report.profile.is_none());
        assert!(source.requested.borrow().is_empty());
    }

    #[test]
    fn profile_is_evenly_spaced() {
        let route = route();
        let source = FixedSource {
            list: Ok(vec![0.0; 4]),
            profile_base: Some(100.0),
            requested: RefCell::new(Vec::new()),
        };
        let report = build_report(&route, &source, true);

        let samples = profile_sample_count(route.total_m());
        assert_eq!(*source.requested.borrow(), vec![samples]);

        let profile = report.profile.unwrap();
        assert_eq!(profile.len(), samples + 1);
        assert_eq!(profile[0].distance_m, 0.0);
        assert!((profile[samples].distance_m - route.total_m()).abs() < 1e-6);
        assert!(profile.windows(2).all(|w| w[1].distance_m > w[0].distance_m));
        assert_eq!(profile[5].elevation_m, 105.0);
    }

    #[test]
    fn failed_service_leaves_cells_blank() {
        let source = FixedSource {
            list: Err(ElevationError::Status(500)),
            profile_base: None,
            requested: RefCell::new(Vec::new()),
        };
        let report = build_report(&route(), &source, true);
        assert!(report.rows.iter().all(|r| r.elevation_m.is_none() && r.amsl_m.is_none()));
        assert_eq!(report.min_elevation, None);
        assert_eq!(report.profile, None);

        let cells = report.rows[1].cells();
        assert_eq!(cells[11], "");
        assert_eq!(cells[12], "");
        assert!(!cells[10].is_empty());
    }

    #[test]
    fn short_sample_array_is_discarded() {
        let source = FixedSource {
            list: Ok(vec![10.0, 20.0]),
            profile_base: None,
            requested: RefCell::new(Vec::new()),
        };
        let report = build_report(&route(), &source, false);
        assert!(report.rows.iter().all(|r| r.elevation_m.is_none()));
    }

    #[test]
    fn negative_minimum_floors_downwards() {
        assert_eq!(floor_to_ten(-3.0), -10.0);
        assert_eq!(floor_to_ten(96.0), 90.0);
        assert_eq!(floor_to_ten(100.0), 100.0);
    }

    #[test]
    fn table_output_format() {
        let source = FixedSource {
            list: Ok(vec![103.0, 117.0, 96.0, 103.0]),
            profile_base: None,
            requested: RefCell::new(Vec::new()),
        };
        let report = build_report(&route(), &source, false);
        let mut buf = Vec::new();
        write_table(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "No\tAct\tLat\tLon\tAlt\tP1\tP2\tP3\tCourse\tLeg (m)\tTotal (m)\tAMSL\tElevation"
        );
        assert_eq!(lines[1], "0\tHOME\t51.0\t-1.0\t0\t0\t0\t0\t\t\t0\t103\t103");
        assert!(lines[2].starts_with("1\tWAYPOINT\t51.01\t-1.0\t50\t\t\t\t0.0\t1111\t1111\t153\t117"));
        assert!(lines[4].starts_with("3\tRTH\t51.0\t-1.0\t0\t"));
        assert!(lines[4].ends_with("\t180.0\t2222\t4445\t103\t103"));
    }

    #[test]
    fn profile_output_truncates_distance() {
        let profile = [
            ProfilePoint { index: 0, distance_m: 0.0, elevation_m: 12.0 },
            ProfilePoint { index: 1, distance_m: 30.9, elevation_m: 14.5 },
        ];
        let mut buf = Vec::new();
        write_profile(&profile, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Index\tDist\tElev\n0\t0\t12\n1\t30\t14.5\n"
        );
    }
}
