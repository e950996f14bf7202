//! Prometheus registry holding the exporter's collector.

use super::{MetricsError, ServerCollector};
use prometheus::{Encoder, Registry, TextEncoder};

/// Private registry exposing only the server metrics.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    /// Creates a registry with `collector` registered.
    pub fn new(collector: ServerCollector) -> Result<Self, MetricsError> {
        let registry = Registry::new();
        registry.register(Box::new(collector))?;
        Ok(Self { registry })
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs one collection and encodes it in Prometheus text format.
    ///
    /// Blocks for the duration of the upstream round trip.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GameTime, MockStatsClient, ServerStats};
    use std::sync::Arc;

    fn registry(client: MockStatsClient) -> MetricsRegistry {
        let collector = ServerCollector::new(Arc::new(client)).unwrap();
        MetricsRegistry::new(collector).unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let client = MockStatsClient::new(ServerStats::default());
        let collector = ServerCollector::new(Arc::new(client)).unwrap();
        assert!(MetricsRegistry::new(collector).is_ok());
    }

    #[test]
    fn test_encode_full_snapshot() {
        let output = registry(MockStatsClient::new(ServerStats {
            game_time: GameTime::new(1, 2, 3),
            players: 3,
            hostiles: 10,
            animals: 2,
        }))
        .encode()
        .unwrap();

        assert!(output.contains("# HELP sdtd_up Is the server reachable?"));
        assert!(output.contains("# TYPE sdtd_up gauge"));
        assert!(output.contains("sdtd_up 1"));
        assert!(output.contains("sdtd_player_count 3"));
        assert!(output.contains("sdtd_zombie_count 10"));
        assert!(output.contains("sdtd_animal_count 2"));
        assert!(output.contains("# TYPE sdtd_gametime_seconds counter"));
        assert!(output.contains("sdtd_gametime_seconds 93780"));
    }

    #[test]
    fn test_encode_unreachable() {
        let output = registry(MockStatsClient::unreachable("connection refused"))
            .encode()
            .unwrap();

        assert!(output.contains("sdtd_up 0"));
        assert!(!output.contains("sdtd_player_count"));
        assert!(!output.contains("sdtd_gametime_seconds"));
    }

    #[test]
    fn test_encode_stats_failure() {
        let output = registry(MockStatsClient::failing_stats("bad gateway"))
            .encode()
            .unwrap();

        assert!(output.contains("sdtd_up 1"));
        assert!(!output.contains("sdtd_zombie_count"));
    }

    #[test]
    fn test_duplicate_collector_rejected() {
        let client = Arc::new(MockStatsClient::new(ServerStats::default()));
        let metrics = MetricsRegistry::new(ServerCollector::new(client.clone()).unwrap()).unwrap();

        let again = ServerCollector::new(client).unwrap();
        assert!(metrics.registry().register(Box::new(again)).is_err());
    }
}
