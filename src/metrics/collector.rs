//! Scrape-time collection bridge.
//!
//! Every scrape makes one fresh round trip to the web API: a connectivity
//! probe followed by a stats fetch. Upstream failures never fail the
//! scrape. They only reduce the set of emitted samples, with `sdtd_up`
//! reporting reachability.

use super::schema::{
    MetricDescriptor, MetricKind, ANIMAL_COUNT, GAMETIME_SECONDS, PLAYER_COUNT, SCHEMA, UP,
    ZOMBIE_COUNT,
};
use crate::client::{ServerStats, StatsClient};
use prometheus::core::{Collector, Desc};
use prometheus::proto::{self, MetricFamily};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The registry rejected the collector or failed to encode.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A single metric value attributed to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    descriptor: MetricDescriptor,
    value: f64,
}

impl Sample {
    /// Creates a sample.
    pub fn new(descriptor: MetricDescriptor, value: f64) -> Self {
        Self { descriptor, value }
    }

    /// The `sdtd_up` sample for the given reachability.
    pub fn up(reachable: bool) -> Self {
        Self::new(UP, if reachable { 1.0 } else { 0.0 })
    }

    /// Returns the descriptor this sample belongs to.
    pub fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    /// Returns the sample value.
    pub fn value(&self) -> f64 {
        self.value
    }

    fn to_metric_family(&self) -> MetricFamily {
        let mut metric = proto::Metric::default();
        match self.descriptor.kind() {
            MetricKind::Gauge => {
                let mut gauge = proto::Gauge::default();
                gauge.set_value(self.value);
                metric.set_gauge(gauge);
            }
            MetricKind::Counter => {
                let mut counter = proto::Counter::default();
                counter.set_value(self.value);
                metric.set_counter(counter);
            }
        }

        let mut family = MetricFamily::default();
        family.set_name(self.descriptor.fq_name());
        family.set_help(self.descriptor.help().to_string());
        family.set_field_type(self.descriptor.kind().metric_type());
        family.mut_metric().push(metric);
        family
    }
}

/// The four data samples derived from one stats snapshot.
fn stats_samples(stats: &ServerStats) -> [Sample; 4] {
    [
        Sample::new(PLAYER_COUNT, f64::from(stats.players)),
        Sample::new(ZOMBIE_COUNT, f64::from(stats.hostiles)),
        Sample::new(ANIMAL_COUNT, f64::from(stats.animals)),
        Sample::new(GAMETIME_SECONDS, stats.game_time.as_seconds() as f64),
    ]
}

/// Collects server metrics on demand.
///
/// Holds no state between scrapes apart from the prebuilt descriptors, so
/// overlapping scrapes need no locking.
pub struct ServerCollector {
    client: Arc<dyn StatsClient>,
    descs: Vec<Desc>,
}

impl ServerCollector {
    /// Creates a collector backed by `client`.
    pub fn new(client: Arc<dyn StatsClient>) -> Result<Self, MetricsError> {
        let descs = SCHEMA
            .iter()
            .map(|descriptor| descriptor.to_desc())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { client, descs })
    }

    /// Returns the exported metric descriptors, identical on every call.
    pub fn describe(&self) -> &'static [MetricDescriptor] {
        &SCHEMA
    }

    /// Runs one collection cycle against the web API.
    ///
    /// Always contains exactly one `sdtd_up` sample, first. The four data
    /// samples follow only if both the probe and the stats fetch succeed.
    pub fn collect(&self) -> Vec<Sample> {
        if let Err(err) = self.client.connect() {
            tracing::warn!(error = %err, "Failed to connect to API server");
            return vec![Sample::up(false)];
        }

        let mut samples = Vec::with_capacity(SCHEMA.len());
        samples.push(Sample::up(true));

        match self.client.server_stats() {
            Ok(stats) => {
                tracing::debug!(
                    players = stats.players,
                    hostiles = stats.hostiles,
                    animals = stats.animals,
                    gametime_seconds = stats.game_time.as_seconds(),
                    "Collected server stats"
                );
                samples.extend(stats_samples(&stats));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to get server stats");
            }
        }

        samples
    }
}

impl Collector for ServerCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        ServerCollector::collect(self)
            .iter()
            .map(Sample::to_metric_family)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, GameTime, MockStatsClient};
    use prometheus::proto::MetricType;
    use proptest::prelude::*;

    fn stats(players: u32, hostiles: u32, animals: u32, game_time: GameTime) -> ServerStats {
        ServerStats {
            game_time,
            players,
            hostiles,
            animals,
        }
    }

    fn collector(client: &Arc<MockStatsClient>) -> ServerCollector {
        ServerCollector::new(client.clone()).unwrap()
    }

    fn names(samples: &[Sample]) -> Vec<String> {
        samples.iter().map(|s| s.descriptor().fq_name()).collect()
    }

    #[test]
    fn test_describe_is_stable() {
        let reachable = collector(&Arc::new(MockStatsClient::new(ServerStats::default())));
        let unreachable = collector(&Arc::new(MockStatsClient::unreachable("refused")));

        let first = reachable.describe();
        assert_eq!(first.len(), 5);
        for _ in 0..3 {
            assert_eq!(reachable.describe(), first);
        }
        assert_eq!(unreachable.describe(), first);
    }

    #[test]
    fn test_describe_does_not_touch_upstream() {
        let client = Arc::new(MockStatsClient::new(ServerStats::default()));
        let collector = collector(&client);

        collector.describe();
        Collector::desc(&collector);

        assert_eq!(client.connect_calls(), 0);
        assert_eq!(client.stats_calls(), 0);
    }

    #[test]
    fn test_unreachable_emits_only_up_zero() {
        let client = Arc::new(MockStatsClient::unreachable("connection refused"));
        let samples = collector(&client).collect();

        assert_eq!(samples, vec![Sample::up(false)]);
        assert_eq!(client.stats_calls(), 0);
    }

    #[test]
    fn test_stats_failure_emits_only_up_one() {
        let client = Arc::new(MockStatsClient::failing_stats("unexpected EOF"));
        let samples = collector(&client).collect();

        assert_eq!(samples, vec![Sample::up(true)]);
        assert_eq!(client.connect_calls(), 1);
        assert_eq!(client.stats_calls(), 1);
    }

    #[test]
    fn test_full_snapshot() {
        let client = Arc::new(MockStatsClient::new(stats(3, 10, 2, GameTime::new(0, 5, 30))));
        let samples = collector(&client).collect();

        assert_eq!(
            samples,
            vec![
                Sample::new(UP, 1.0),
                Sample::new(PLAYER_COUNT, 3.0),
                Sample::new(ZOMBIE_COUNT, 10.0),
                Sample::new(ANIMAL_COUNT, 2.0),
                Sample::new(GAMETIME_SECONDS, 19_800.0),
            ]
        );
    }

    #[test]
    fn test_gametime_conversion() {
        let client = Arc::new(MockStatsClient::new(stats(0, 0, 0, GameTime::new(1, 2, 3))));
        let samples = collector(&client).collect();

        let gametime = samples
            .iter()
            .find(|s| *s.descriptor() == GAMETIME_SECONDS)
            .unwrap();
        assert_eq!(gametime.value(), 93_780.0);
    }

    #[test]
    fn test_gametime_may_decrease_after_world_reset() {
        let client = Arc::new(MockStatsClient::new(stats(1, 0, 0, GameTime::new(7, 0, 0))));
        let collector = collector(&client);
        let before = collector.collect()[4].value();

        client.set_stats(Ok(stats(1, 0, 0, GameTime::new(0, 1, 0))));
        let after = collector.collect()[4];

        assert_eq!(after.descriptor().kind(), MetricKind::Counter);
        assert!(after.value() < before);
        assert_eq!(after.value(), 3_600.0);
    }

    #[test]
    fn test_each_scrape_polls_upstream() {
        let client = Arc::new(MockStatsClient::new(ServerStats::default()));
        let collector = collector(&client);

        for _ in 0..3 {
            collector.collect();
        }

        assert_eq!(client.connect_calls(), 3);
        assert_eq!(client.stats_calls(), 3);
    }

    #[test]
    fn test_recovers_after_outage() {
        let client = Arc::new(MockStatsClient::new(stats(2, 0, 0, GameTime::default())));
        let collector = collector(&client);

        client.set_connect(Err(ClientError::ConnectFailed {
            endpoint: "mock".into(),
            reason: "timed out".into(),
        }));
        assert_eq!(collector.collect().len(), 1);

        client.set_connect(Ok(()));
        assert_eq!(collector.collect().len(), 5);
    }

    #[test]
    fn test_prometheus_collector_families() {
        let client = Arc::new(MockStatsClient::new(stats(3, 10, 2, GameTime::new(0, 5, 30))));
        let collector = collector(&client);

        assert_eq!(Collector::desc(&collector).len(), 5);

        let families = Collector::collect(&collector);
        assert_eq!(families.len(), 5);

        let up = &families[0];
        assert_eq!(up.get_name(), "sdtd_up");
        assert_eq!(up.get_field_type(), MetricType::GAUGE);
        assert_eq!(up.get_metric()[0].get_gauge().get_value(), 1.0);

        let gametime = &families[4];
        assert_eq!(gametime.get_name(), "sdtd_gametime_seconds");
        assert_eq!(gametime.get_field_type(), MetricType::COUNTER);
        assert_eq!(gametime.get_metric()[0].get_counter().get_value(), 19_800.0);
    }

    proptest! {
        #[test]
        fn prop_samples_are_all_or_nothing(
            reachable in any::<bool>(),
            stats_ok in any::<bool>(),
            players in any::<u32>(),
            hostiles in any::<u32>(),
            animals in any::<u32>(),
            days in 0u32..10_000,
            hours in 0u32..24,
            minutes in 0u32..60,
        ) {
            let snapshot = stats(players, hostiles, animals, GameTime::new(days, hours, minutes));
            let client = Arc::new(MockStatsClient::new(snapshot));
            if !reachable {
                client.set_connect(Err(ClientError::ConnectFailed {
                    endpoint: "mock".into(),
                    reason: "refused".into(),
                }));
            }
            if !stats_ok {
                client.set_stats(Err(ClientError::Decode {
                    endpoint: "mock".into(),
                    reason: "bad json".into(),
                }));
            }

            let samples = collector(&client).collect();
            let ups = samples.iter().filter(|s| *s.descriptor() == UP).count();
            prop_assert_eq!(ups, 1);
            prop_assert_eq!(samples[0], Sample::up(reachable));

            let expected = if reachable && stats_ok { 5 } else { 1 };
            prop_assert_eq!(samples.len(), expected);

            if expected == 5 {
                prop_assert_eq!(&names(&samples[1..]), &names(&stats_samples(&snapshot)));
                prop_assert_eq!(samples[1].value(), players as f64);
                prop_assert_eq!(samples[4].value(), snapshot.game_time.as_seconds() as f64);
            }
        }
    }
}
