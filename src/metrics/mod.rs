//! Prometheus exporter for dedicated server statistics.
//!
//! Metrics are gathered at scrape time: each request to the telemetry
//! path triggers exactly one probe and one stats fetch against the web
//! API. Nothing is cached between scrapes.
//!
//! # Metrics Exposed
//!
//! - `sdtd_up` - Whether the web API is reachable (1=up, 0=down)
//! - `sdtd_player_count` - Online players
//! - `sdtd_zombie_count` - Active zombies
//! - `sdtd_animal_count` - Active animals
//! - `sdtd_gametime_seconds` - In-game time in seconds (counter; resets with the world)
//!
//! When the web API is unreachable only `sdtd_up 0` is exported. When it
//! is reachable but the stats request fails, only `sdtd_up 1` is exported.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sdtd_exporter::client::{GameTime, MockStatsClient, ServerStats};
//! use sdtd_exporter::metrics::{MetricsRegistry, ServerCollector};
//!
//! let client = MockStatsClient::new(ServerStats {
//!     game_time: GameTime::new(0, 5, 30),
//!     players: 3,
//!     hostiles: 10,
//!     animals: 2,
//! });
//! let collector = ServerCollector::new(Arc::new(client)).expect("valid schema");
//! let registry = MetricsRegistry::new(collector).expect("registration");
//!
//! let text = registry.encode().expect("encoding");
//! assert!(text.contains("sdtd_gametime_seconds 19800"));
//! ```

mod collector;
mod landing;
mod registry;
pub mod schema;
mod server;

pub use collector::{MetricsError, Sample, ServerCollector};
pub use landing::{LandingConfig, LandingLink, LandingPage};
pub use registry::MetricsRegistry;
pub use schema::{MetricDescriptor, MetricKind, SCHEMA};
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
