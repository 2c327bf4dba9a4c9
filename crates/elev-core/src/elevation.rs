//! Elevation source abstraction.

use crate::models::Coordinate;
use thiserror::Error;

/// The remote service returns at most 1024 samples per polyline request,
/// so at most 1023 intervals can be asked for.
pub const MAX_SAMPLE_COUNT: usize = 1023;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElevationError {
    #[error("elevation request failed: {0}")]
    Transport(String),
    #[error("elevation service HTTP {0}")]
    Status(u16),
    #[error("malformed elevation payload: {0}")]
    Payload(String),
    #[error("elevation service returned {got} samples, expected {expected}")]
    SampleCount { expected: usize, got: usize },
}

/// A provider of terrain elevations, in metres.
///
/// Implementations return either a complete, positionally aligned array or
/// an error; never a partial result.
pub trait ElevationSource {
    /// One elevation per input coordinate, in input order.
    fn fetch_list(&self, points: &[Coordinate]) -> Result<Vec<f64>, ElevationError>;

    /// `samples + 1` evenly spaced elevations along the path through `points`.
    /// `samples` must not exceed [`MAX_SAMPLE_COUNT`].
    fn fetch_polyline(
        &self,
        points: &[Coordinate],
        samples: usize,
    ) -> Result<Vec<f64>, ElevationError>;
}
