//! Fixed metric schema.

use prometheus::core::Desc;
use prometheus::proto::MetricType;
use std::collections::HashMap;

/// Namespace prefixed to every exported metric.
pub const NAMESPACE: &str = "sdtd";

/// Type a metric is declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Value that can go up and down.
    Gauge,
    /// Value expected to only increase.
    Counter,
}

impl MetricKind {
    pub(crate) fn metric_type(self) -> MetricType {
        match self {
            MetricKind::Gauge => MetricType::GAUGE,
            MetricKind::Counter => MetricType::COUNTER,
        }
    }
}

/// Static metadata identifying one exported series. No labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    subsystem: &'static str,
    name: &'static str,
    help: &'static str,
    kind: MetricKind,
}

impl MetricDescriptor {
    const fn new(
        subsystem: &'static str,
        name: &'static str,
        help: &'static str,
        kind: MetricKind,
    ) -> Self {
        Self {
            subsystem,
            name,
            help,
            kind,
        }
    }

    /// Fully-qualified metric name, e.g. `sdtd_player_count`.
    pub fn fq_name(&self) -> String {
        build_fq_name(NAMESPACE, self.subsystem, self.name)
    }

    /// Help text.
    pub fn help(&self) -> &'static str {
        self.help
    }

    /// Declared metric type.
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub(crate) fn to_desc(self) -> prometheus::Result<Desc> {
        Desc::new(
            self.fq_name(),
            self.help.to_string(),
            Vec::new(),
            HashMap::new(),
        )
    }
}

/// Whether the web API answered the connectivity probe.
pub const UP: MetricDescriptor =
    MetricDescriptor::new("", "up", "Is the server reachable?", MetricKind::Gauge);

/// Online players.
pub const PLAYER_COUNT: MetricDescriptor = MetricDescriptor::new(
    "player",
    "count",
    "The number of online players.",
    MetricKind::Gauge,
);

/// Active hostile entities.
pub const ZOMBIE_COUNT: MetricDescriptor = MetricDescriptor::new(
    "zombie",
    "count",
    "The number of active zombies.",
    MetricKind::Gauge,
);

/// Active animal entities.
pub const ANIMAL_COUNT: MetricDescriptor = MetricDescriptor::new(
    "animal",
    "count",
    "The number of active animals.",
    MetricKind::Gauge,
);

/// In-game clock in seconds.
///
/// Declared as a counter for compatibility with existing dashboards even
/// though it drops back when the world resets. Consumers should expect
/// `rate()` to see a counter reset at that point.
pub const GAMETIME_SECONDS: MetricDescriptor = MetricDescriptor::new(
    "gametime",
    "seconds",
    "The current time in the game.",
    MetricKind::Counter,
);

/// Every exported metric, in describe order.
pub const SCHEMA: [MetricDescriptor; 5] = [
    UP,
    PLAYER_COUNT,
    ZOMBIE_COUNT,
    ANIMAL_COUNT,
    GAMETIME_SECONDS,
];

/// Joins the non-empty name components with underscores.
///
/// Returns an empty string when `name` is empty.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
