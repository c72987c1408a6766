//! Game clock advanced once per tick

use crate::core::calendar::{Calendar, GameTime, Season};
use crate::core::config::{BlockConfig, EngineConfig};

#[derive(Debug, Clone)]
pub struct GameClock {
    calendar: Calendar,
    millis_per_tick: i64,
    ticks: u64,
}

impl GameClock {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            calendar: Calendar::new(),
            millis_per_tick: config.game_millis_per_tick(),
            ticks: 0,
        }
    }

    /// One tick of simulated time
    pub fn advance(&mut self) -> GameTime {
        self.calendar.advance_millis(self.millis_per_tick);
        self.ticks += 1;
        self.calendar.game_time()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn game_time(&self) -> GameTime {
        self.calendar.game_time()
    }

    pub fn season(&self, blocks: &BlockConfig) -> Season {
        blocks.season_for_month(self.calendar.month0())
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_each_tick_adds_scaled_period() {
        let config = EngineConfig {
            tick_freq_hz: 2,
            time_mult: 1000.0,
            ..EngineConfig::default()
        };
        let mut clock = GameClock::new(&config);
        let start = clock.game_time();

        let after = clock.advance();
        assert_eq!(after.time_ms - start.time_ms, 500 * 1000);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn test_season_follows_month() {
        // One simulated day per tick
        let config = EngineConfig {
            tick_freq_hz: 1,
            time_mult: 86_400.0,
            ..EngineConfig::default()
        };
        let blocks = BlockConfig::default();
        let mut clock = GameClock::new(&config);
        assert_eq!(clock.season(&blocks), Season::Winter);

        for _ in 0..100 {
            clock.advance();
        }
        // Day 101 of year 1 is in April
        assert_eq!(clock.calendar().now().month(), 4);
        assert_eq!(clock.season(&blocks), Season::Spring);
    }
}
