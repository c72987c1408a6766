//! Simulated game calendar
//!
//! Game time runs independently of wall-clock time. Each tick advances it by
//! `tick period * time_mult`; when the calendar runs past the representable
//! range it wraps back to the first instant and the epoch counter increments.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Season of the year, selected per month by the block configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        };
        f.write_str(name)
    }
}

/// Snapshot of the game clock handed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    /// Milliseconds relative to the unix epoch (negative for early years)
    pub time_ms: i64,
    pub epoch: u32,
}

/// Calendar tracks simulated time with millisecond granularity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    now: NaiveDateTime,
    epoch: u32,
}

impl Calendar {
    /// 0001-01-01T00:00:00
    pub fn initial_instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN)
    }

    pub fn new() -> Self {
        Self {
            now: Self::initial_instant(),
            epoch: 0,
        }
    }

    /// Advance by `millis` of game time, wrapping into a new epoch on overflow
    pub fn advance_millis(&mut self, millis: i64) {
        let next = TimeDelta::try_milliseconds(millis)
            .and_then(|delta| self.now.checked_add_signed(delta));
        match next {
            Some(t) => self.now = t,
            None => {
                self.now = Self::initial_instant();
                self.epoch = self.epoch.wrapping_add(1);
            }
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Zero-based month (0 = January)
    pub fn month0(&self) -> usize {
        self.now.month0() as usize
    }

    pub fn game_time(&self) -> GameTime {
        GameTime {
            time_ms: self.now.and_utc().timestamp_millis(),
            epoch: self.epoch,
        }
    }

    #[cfg(test)]
    pub(crate) fn at(now: NaiveDateTime) -> Self {
        Self { now, epoch: 0 }
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new()
    }
}
