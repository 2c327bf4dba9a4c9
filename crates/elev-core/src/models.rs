//! Core data models for mission profiling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Error returned when a `lat,lon` pair cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location '{0}', expected lat,lon")]
pub struct ParseCoordinateError(pub String);

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    /// Parse a `lat,lon` pair such as `51.0,-1.0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordinateError(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(err)?;
        let lat: f64 = lat.trim().parse().map_err(|_| err())?;
        let lon: f64 = lon.trim().parse().map_err(|_| err())?;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(err());
        }
        Ok(Self { lat, lon })
    }
}

/// Mission item action tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Synthetic home point (never present in a mission file)
    Home,
    Waypoint,
    /// Hold position indefinitely; terminates the route
    PosholdUnlim,
    PosholdTime,
    /// Return to home
    Rth,
    /// Point of interest annotation, not navigational
    SetPoi,
    Jump,
    SetHead,
    Land,
    /// Any tag this tool does not interpret, kept verbatim
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Home => "HOME",
            Action::Waypoint => "WAYPOINT",
            Action::PosholdUnlim => "POSHOLD_UNLIM",
            Action::PosholdTime => "POSHOLD_TIME",
            Action::Rth => "RTH",
            Action::SetPoi => "SET_POI",
            Action::Jump => "JUMP",
            Action::SetHead => "SET_HEAD",
            Action::Land => "LAND",
            Action::Other(tag) => tag,
        }
    }

    /// Whether the action contributes a position to the flown route.
    pub fn is_navigational(&self) -> bool {
        !matches!(self, Action::SetPoi)
    }
}

impl From<&str> for Action {
    fn from(tag: &str) -> Self {
        match tag {
            "HOME" => Action::Home,
            "WAYPOINT" => Action::Waypoint,
            "POSHOLD_UNLIM" => Action::PosholdUnlim,
            "POSHOLD_TIME" => Action::PosholdTime,
            "RTH" => Action::Rth,
            "SET_POI" => Action::SetPoi,
            "JUMP" => Action::Jump,
            "SET_HEAD" => Action::SetHead,
            "LAND" => Action::Land,
            other => Action::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw mission item as read from the mission file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionItem {
    pub no: u32,
    pub action: Action,
    pub position: Coordinate,
    /// Altitude relative to home, metres
    pub alt: i32,
    /// parameter1..parameter3, passed through untouched
    pub params: [String; 3],
}

impl MissionItem {
    pub fn new(no: u32, action: Action, lat: f64, lon: f64, alt: i32) -> Self {
        Self {
            no,
            action,
            position: Coordinate::new(lat, lon),
            alt,
            params: Default::default(),
        }
    }
}

/// A sequenced waypoint, enriched with course and distance from its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub no: u32,
    pub action: Action,
    pub position: Coordinate,
    pub alt: i32,
    pub params: [String; 3],
    /// Initial course from the previous waypoint, degrees. None for the first point.
    pub course_deg: Option<f64>,
    /// Leg length from the previous waypoint, metres. None for the first point.
    pub leg_m: Option<f64>,
    /// Cumulative route distance, metres
    pub total_m: f64,
}

impl Waypoint {
    /// Plot tick label for this waypoint.
    pub fn label(&self) -> String {
        match self.action {
            Action::Home => "Home".to_string(),
            Action::Rth => "RTH".to_string(),
            _ => format!("WP{}", self.no),
        }
    }
}

/// Ordered, read-only sequence of waypoints produced by the sequencer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

impl Route {
    pub(crate) fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.waypoints.iter().map(|wp| wp.position).collect()
    }

    /// Total route length in metres.
    pub fn total_m(&self) -> f64 {
        self.waypoints.last().map(|wp| wp.total_m).unwrap_or(0.0)
    }
}
