//! SDTD Exporter Library
//!
//! Exposes statistics of a 7 Days to Die dedicated server as Prometheus
//! metrics by polling its web API on every scrape.
//!
//! # Architecture
//!
//! ```text
//! scrape request → metrics server → collector → client → web API
//!                        ↑              │
//!                        └── samples ───┘
//! ```
//!
//! # Design Principles
//!
//! - **Fresh per scrape**: one upstream round trip per scrape, no cache
//! - **Never fail the scrape**: upstream errors only drop samples, `sdtd_up` reports health
//! - **Fixed schema**: five metrics, no labels, declared once

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod logging;
pub mod metrics;

pub use client::{ClientError, GameTime, MockStatsClient, SdtdClient, ServerStats, StatsClient};
pub use config::{ConfigError, ExporterConfig};
pub use metrics::{MetricsRegistry, MetricsServer, Sample, ServerCollector};

/// Exporter name reported at startup and on the landing page.
pub const EXPORTER_NAME: &str = "sdtd_exporter";

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup errors. All of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The web API client could not be built.
    #[error("failed to create web API client: {0}")]
    Client(#[from] ClientError),
    /// The collector could not be registered.
    #[error("failed to set up metrics: {0}")]
    Metrics(#[from] metrics::MetricsError),
    /// The metrics server failed to start or stopped with an error.
    #[error(transparent)]
    Server(#[from] metrics::ServerError),
    /// The tokio runtime could not be created.
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
}
