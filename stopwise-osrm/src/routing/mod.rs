//! HTTP-based cost queries against an OSRM routing service.
//!
//! This module provides [`OsrmClient`], an implementation of
//! [`stopwise_core::CostQueryClient`] backed by OSRM's Route and Table
//! services.
//!
//! # Architecture
//!
//! Route queries ask for the road path through an ordered list of
//! waypoints, returning distance, duration and a GeoJSON polyline. Table
//! queries ask for distances and durations between every pair of
//! coordinates in one request. The synchronous [`CostQueryClient`] trait is
//! implemented by blocking on async HTTP calls internally, keeping the core
//! library embeddable in synchronous contexts and callable from rayon
//! workers.
//!
//! [`CostQueryClient`]: stopwise_core::CostQueryClient
//!
//! # Example
//!
//! ```no_run
//! use stopwise_osrm::{OsrmClient, OsrmClientConfig};
//! use stopwise_core::{Coordinate, CostQueryClient};
//! use std::time::Duration;
//!
//! let config = OsrmClientConfig::new("http://localhost:5000")
//!     .with_profile("driving")
//!     .with_timeout(Duration::from_secs(60));
//! let client = OsrmClient::with_config(config)?;
//!
//! let stops = [Coordinate::new(51.5, -0.1)?, Coordinate::new(51.6, -0.2)?];
//! let route = client.route(&stops)?;
//! println!("Road distance: {} m", route.distance_m);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod osrm;

#[doc(hidden)]
pub mod test_support;

pub use client::{
    ClientBuildError, DEFAULT_BASE_URL, DEFAULT_PROFILE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    OsrmClient, OsrmClientConfig,
};
