//! Waypoint sequencing: turns raw mission items into an ordered route.
//!
//! Walks the mission in file order, accumulating course and distance from
//! the previous position. Sequencing may end early:
//! - `RTH` with no known home truncates the route before the RTH item
//! - `POSHOLD_UNLIM` is included and ends the route

use crate::geodesy::course_and_distance_m;
use crate::models::{Action, Coordinate, MissionItem, Route, Waypoint};
use serde::Serialize;
use std::ops::ControlFlow;
use thiserror::Error;

/// Why sequencing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every mission item was consumed
    Completed,
    /// An RTH item was reached with no home location to return to
    TruncatedNoHome,
    /// An unlimited position hold ended the route
    StoppedAtHold,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("truncated mission: {len} usable waypoint(s) ({termination:?})")]
    Truncated { termination: Termination, len: usize },
}

/// A route together with the reason sequencing ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedRoute {
    pub route: Route,
    pub termination: Termination,
}

struct Accumulator {
    waypoints: Vec<Waypoint>,
    previous: Option<Coordinate>,
    total_m: f64,
}

impl Accumulator {
    fn push(&mut self, no: u32, action: Action, position: Coordinate, alt: i32, params: [String; 3]) {
        let (course_deg, leg_m) = match self.previous {
            Some(prev) => {
                let (course, dist) = course_and_distance_m(prev, position);
                (Some(course), Some(dist))
            }
            None => (None, None),
        };
        self.total_m += leg_m.unwrap_or(0.0);
        self.previous = Some(position);
        self.waypoints.push(Waypoint {
            no,
            action,
            position,
            alt,
            params,
            course_deg,
            leg_m,
            total_m: self.total_m,
        });
    }
}

/// Build the flown route from raw mission items.
///
/// When `home` is given, a synthetic HOME waypoint leads the route and RTH
/// items are flown back to it at altitude 0. Fails with
/// [`SequenceError::Truncated`] when fewer than two waypoints remain.
pub fn build_route(
    items: &[MissionItem],
    home: Option<Coordinate>,
) -> Result<SequencedRoute, SequenceError> {
    let mut acc = Accumulator {
        waypoints: Vec::with_capacity(items.len() + 1),
        previous: None,
        total_m: 0.0,
    };
    if let Some(home) = home {
        acc.push(0, Action::Home, home, 0, ["0", "0", "0"].map(String::from));
    }

    let flow = items
        .iter()
        .filter(|item| item.action.is_navigational())
        .try_for_each(|item| {
            let (position, alt) = match (&item.action, home) {
                (Action::Rth, None) => return ControlFlow::Break(Termination::TruncatedNoHome),
                (Action::Rth, Some(home)) => (home, 0),
                _ => (item.position, item.alt),
            };
            acc.push(item.no, item.action.clone(), position, alt, item.params.clone());
            if item.action == Action::PosholdUnlim {
                return ControlFlow::Break(Termination::StoppedAtHold);
            }
            ControlFlow::Continue(())
        });

    let termination = match flow {
        ControlFlow::Break(reason) => reason,
        ControlFlow::Continue(()) => Termination::Completed,
    };
    tracing::debug!(
        "Sequenced {} waypoints, {:.0} m ({:?})",
        acc.waypoints.len(),
        acc.total_m,
        termination
    );

    if acc.waypoints.len() < 2 {
        return Err(SequenceError::Truncated {
            termination,
            len: acc.waypoints.len(),
        });
    }

    Ok(SequencedRoute {
        route: Route::new(acc.waypoints),
        termination,
    })
}
