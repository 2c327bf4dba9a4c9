//! Elevation service configuration from environment.

use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://dev.virtualearth.net";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout; None keeps the HTTP client default
    pub timeout: Option<Duration>,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: None,
        }
    }
}

impl ElevationConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("ELEVATION_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: env::var("ELEVATION_API_KEY")
                .or_else(|_| env::var("BING_MAPS_KEY"))
                .unwrap_or_default(),
            timeout: env::var("ELEVATION_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
        }
    }
}
