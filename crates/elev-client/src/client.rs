//! Blocking HTTP client for the Bing Maps REST elevation API.

use crate::config::ElevationConfig;
use elev_core::polyline;
use elev_core::{Coordinate, ElevationError, ElevationSource, MAX_SAMPLE_COUNT};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

/// Request mode of the elevation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One elevation per supplied point
    List,
    /// Evenly spaced samples along the supplied path
    Polyline,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::List => "List",
            Mode::Polyline => "Polyline",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElevationResponse {
    #[serde(default)]
    resource_sets: Vec<ResourceSet>,
}

#[derive(Debug, Deserialize)]
struct ResourceSet {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    elevations: Option<Vec<f64>>,
}

/// HTTP client for fetching terrain elevations.
pub struct BingElevationClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BingElevationClient {
    pub fn new(config: &ElevationConfig) -> Result<Self, ElevationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ElevationError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build the request URL for `points`. `samples` is the number of values
    /// requested from the service (polyline mode only).
    pub fn request_url(
        &self,
        mode: Mode,
        points: &[Coordinate],
        samples: Option<usize>,
    ) -> Result<Url, ElevationError> {
        let mut url = Url::parse(&format!("{}/REST/v1/Elevation/{}", self.base_url, mode.as_str()))
            .map_err(|err| ElevationError::Transport(format!("invalid base URL: {err}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("points", &polyline::encode(points));
            if let Some(samples) = samples {
                query.append_pair("samp", &samples.to_string());
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    fn request(&self, url: Url) -> Result<Vec<f64>, ElevationError> {
        tracing::debug!("GET {}{}", url.host_str().unwrap_or_default(), url.path());
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ElevationError::Transport(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(ElevationError::Status(response.status().as_u16()));
        }

        let payload: ElevationResponse = response
            .json()
            .map_err(|err| ElevationError::Payload(err.to_string()))?;

        payload
            .resource_sets
            .into_iter()
            .next()
            .and_then(|set| set.resources.into_iter().next())
            .and_then(|resource| resource.elevations)
            .ok_or_else(|| ElevationError::Payload("missing elevations array".to_string()))
    }
}

/// Collapse runs of points that are identical at codec precision.
///
/// Returns the distinct points and, for each input point, the index of its
/// distinct representative. Leading points at the origin encode to nothing
/// and have no representative.
fn collapse_repeats(points: &[Coordinate]) -> (Vec<Coordinate>, Vec<Option<usize>>) {
    let mut distinct: Vec<Coordinate> = Vec::with_capacity(points.len());
    let mut mapping = Vec::with_capacity(points.len());
    // The codec encodes each point relative to the previous one, starting from (0, 0).
    let mut last = (0, 0);
    for point in points {
        let key = polyline::fixed(point);
        if key != last {
            distinct.push(*point);
            last = key;
        }
        mapping.push(distinct.len().checked_sub(1));
    }
    (distinct, mapping)
}

impl ElevationSource for BingElevationClient {
    fn fetch_list(&self, points: &[Coordinate]) -> Result<Vec<f64>, ElevationError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        // A repeated point encodes to nothing, so the service would return
        // fewer values than were asked for.
        let (distinct, mapping) = collapse_repeats(points);
        if mapping[0].is_none() {
            tracing::warn!("Leading point at 0,0 cannot be encoded, using sea level");
        }
        if distinct.is_empty() {
            return Ok(vec![0.0; points.len()]);
        }
        let url = self.request_url(Mode::List, &distinct, None)?;
        let elevations = self.request(url)?;
        if elevations.len() != distinct.len() {
            return Err(ElevationError::SampleCount {
                expected: distinct.len(),
                got: elevations.len(),
            });
        }

        Ok(mapping
            .into_iter()
            .map(|idx| idx.map_or(0.0, |idx| elevations[idx]))
            .collect())
    }

    fn fetch_polyline(
        &self,
        points: &[Coordinate],
        samples: usize,
    ) -> Result<Vec<f64>, ElevationError> {
        let samples = samples.min(MAX_SAMPLE_COUNT);
        let url = self.request_url(Mode::Polyline, points, Some(samples + 1))?;
        let elevations = self.request(url)?;
        if elevations.len() != samples + 1 {
            return Err(ElevationError::SampleCount {
                expected: samples + 1,
                got: elevations.len(),
            });
        }
        Ok(elevations)
    }
}
