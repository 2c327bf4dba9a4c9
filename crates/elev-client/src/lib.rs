//! Remote elevation service client.
//!
//! Implements [`elev_core::ElevationSource`] over the Bing Maps REST
//! Elevations API using point-compressed coordinates.

pub mod client;
pub mod config;

pub use client::{BingElevationClient, Mode};
pub use config::ElevationConfig;
