pub mod elevation;
pub mod geodesy;
pub mod mission;
pub mod models;
pub mod plot;
pub mod polyline;
pub mod report;
pub mod sequencer;

pub use elevation::{ElevationError, ElevationSource, MAX_SAMPLE_COUNT};
pub use geodesy::{course_and_distance, course_and_distance_m, METERS_PER_NM};
pub use mission::{parse_mission, read_mission, MissionError};
pub use models::{Action, Coordinate, MissionItem, ParseCoordinateError, Route, Waypoint};
pub use plot::{svg_path, PlotScript, Tick};
pub use report::{
    build_report, profile_sample_count, write_profile, write_table, ProfilePoint, Report,
    ReportRow,
};
pub use sequencer::{build_route, SequenceError, SequencedRoute, Termination};
