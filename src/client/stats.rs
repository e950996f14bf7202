//! Server statistics snapshot as reported by the web API.

use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// In-game clock reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    /// Elapsed in-game days.
    pub days: u32,
    /// Hour of the current day.
    pub hours: u32,
    /// Minute of the current hour.
    pub minutes: u32,
}

impl GameTime {
    /// Creates a game time reading.
    pub fn new(days: u32, hours: u32, minutes: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
        }
    }

    /// Converts the reading into seconds since day zero.
    ///
    /// Upstream does not guarantee `hours < 24` or `minutes < 60`, so
    /// each component is scaled independently rather than normalized.
    pub fn as_seconds(&self) -> u64 {
        u64::from(self.days) * SECONDS_PER_DAY
            + u64::from(self.hours) * SECONDS_PER_HOUR
            + u64::from(self.minutes) * SECONDS_PER_MINUTE
    }
}

/// A single snapshot of server statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    /// Current in-game time.
    pub game_time: GameTime,
    /// Online players.
    pub players: u32,
    /// Active hostile entities (zombies).
    pub hostiles: u32,
    /// Active animal entities.
    pub animals: u32,
}
