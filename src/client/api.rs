//! Remote stats client abstraction.
//!
//! The collector only talks to the upstream through this trait, so the
//! HTTP client can be swapped for a scripted mock in tests.

use super::ServerStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while talking to the server web API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The client could not be built from the given settings.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    /// The connectivity check did not get an HTTP response.
    #[error("failed to connect to {endpoint}: {reason}")]
    ConnectFailed {
        /// URL that was requested.
        endpoint: String,
        /// Transport error description.
        reason: String,
    },
    /// A stats request failed before a complete response arrived.
    #[error("request to {endpoint} failed: {reason}")]
    RequestFailed {
        /// URL that was requested.
        endpoint: String,
        /// Transport error description.
        reason: String,
    },
    /// The web API answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    UnexpectedStatus {
        /// URL that was requested.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },
    /// The response body was not a valid stats document.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode {
        /// URL that was requested.
        endpoint: String,
        /// Decoder error description.
        reason: String,
    },
}

/// Trait for server web API clients.
///
/// Both calls block until the upstream answers or the client's own
/// deadline expires.
pub trait StatsClient: Send + Sync {
    /// Checks that the API is reachable and accepts our credentials.
    fn connect(&self) -> Result<(), ClientError>;

    /// Fetches the current server statistics.
    fn server_stats(&self) -> Result<ServerStats, ClientError>;
}

/// Scripted client for tests and demos.
///
/// Returns the configured outcomes on every call and counts how often
/// each call was made.
#[derive(Debug)]
pub struct MockStatsClient {
    connect_result: Mutex<Result<(), ClientError>>,
    stats_result: Mutex<Result<ServerStats, ClientError>>,
    connect_calls: AtomicU64,
    stats_calls: AtomicU64,
}

impl MockStatsClient {
    /// Creates a reachable mock that serves `stats`.
    pub fn new(stats: ServerStats) -> Self {
        Self {
            connect_result: Mutex::new(Ok(())),
            stats_result: Mutex::new(Ok(stats)),
            connect_calls: AtomicU64::new(0),
            stats_calls: AtomicU64::new(0),
        }
    }

    /// Creates a mock whose connectivity probe always fails.
    pub fn unreachable(reason: &str) -> Self {
        let mock = Self::new(ServerStats::default());
        mock.set_connect(Err(ClientError::ConnectFailed {
            endpoint: "mock".into(),
            reason: reason.into(),
        }));
        mock
    }

    /// Creates a mock that is reachable but fails every stats request.
    pub fn failing_stats(reason: &str) -> Self {
        let mock = Self::new(ServerStats::default());
        mock.set_stats(Err(ClientError::Decode {
            endpoint: "mock".into(),
            reason: reason.into(),
        }));
        mock
    }

    /// Replaces the outcome of subsequent `connect` calls.
    pub fn set_connect(&self, result: Result<(), ClientError>) {
        *self
            .connect_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = result;
    }

    /// Replaces the outcome of subsequent `server_stats` calls.
    pub fn set_stats(&self, result: Result<ServerStats, ClientError>) {
        *self
            .stats_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = result;
    }

    /// Number of `connect` calls so far.
    pub fn connect_calls(&self) -> u64 {
        self.connect_calls.load(Ordering::Relaxed)
    }

    /// Number of `server_stats` calls so far.
    pub fn stats_calls(&self) -> u64 {
        self.stats_calls.load(Ordering::Relaxed)
    }
}

impl StatsClient for MockStatsClient {
    fn connect(&self) -> Result<(), ClientError> {
        self.connect_calls.fetch_add(1, Ordering::Relaxed);
        self.connect_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn server_stats(&self) -> Result<ServerStats, ClientError> {
        self.stats_calls.fetch_add(1, Ordering::Relaxed);
        self.stats_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GameTime;

    #[test]
    fn test_mock_serves_stats() {
        let stats = ServerStats {
            game_time: GameTime::new(1, 0, 0),
            players: 4,
            hostiles: 0,
            animals: 1,
        };
        let client = MockStatsClient::new(stats);

        assert!(client.connect().is_ok());
        assert_eq!(client.server_stats().unwrap(), stats);
        assert_eq!(client.connect_calls(), 1);
        assert_eq!(client.stats_calls(), 1);
    }

    #[test]
    fn test_mock_unreachable() {
        let client = MockStatsClient::unreachable("connection refused");
        assert!(matches!(
            client.connect(),
            Err(ClientError::ConnectFailed { .. })
        ));
    }

    #[test]
    fn test_mock_outcome_can_change() {
        let client = MockStatsClient::failing_stats("truncated body");
        assert!(client.server_stats().is_err());

        client.set_stats(Ok(ServerStats::default()));
        assert!(client.server_stats().is_ok());
        assert_eq!(client.stats_calls(), 2);
    }
}
