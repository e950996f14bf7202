//! Client for the dedicated server web API.
//!
//! The exporter only needs two calls from the upstream: a connectivity
//! probe and a statistics fetch. [`StatsClient`] captures that surface;
//! [`SdtdClient`] implements it over HTTP and [`MockStatsClient`] serves
//! scripted results for tests.

mod api;
mod http;
mod stats;

pub use api::{ClientError, MockStatsClient, StatsClient};
pub use http::SdtdClient;
pub use stats::{GameTime, ServerStats};
