//! Bunny Click - tap as fast as you can
//!
//! Core modules:
//! - `engine`: Session lifecycle, timers, TPS measurement and events
//! - `feedback`: Audio/visual cue derivation for external effect sinks
//! - `storage`: Settings, game history and high score persistence
//! - `autotap`: Seeded tap schedules for demo mode and tests
//! - `web`: Browser binding (wasm32 only)

pub mod autotap;
pub mod clock;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod highscores;
pub mod input;
pub mod settings;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{GameEngine, GameEvent, GameMode, GameSnapshot, Participant, SessionPhase};
pub use error::{EngineError, StorageError};
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Trailing window for TPS measurement (ms)
    pub const TPS_WINDOW_MS: u64 = 1000;
    /// TPS span covered by one effect level
    pub const TPS_SPEED_STEP: f64 = 0.5;
    /// Highest effect level
    pub const TPS_MAX_LEVEL: u32 = 10;

    /// Countdown timer period (ms)
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
    /// UI broadcast timer period (ms)
    pub const BROADCAST_INTERVAL_MS: u64 = 100;
    /// TPS recompute timer period (ms)
    pub const TPS_SAMPLE_INTERVAL_MS: u64 = 100;

    /// Session length bounds (seconds)
    pub const DEFAULT_GAME_DURATION: u32 = 30;
    pub const MIN_GAME_DURATION: u32 = 1;
    pub const MAX_GAME_DURATION: u32 = 600;

    /// Click sound volume: base plus a TPS bonus, capped
    pub const CLICK_BASE_VOLUME: f32 = 0.3;
    pub const CLICK_VOLUME_PER_TPS: f32 = 0.05;
    pub const CLICK_MAX_TPS_BONUS: f32 = 0.4;

    /// Vibration length per TPS and cap (ms)
    pub const VIBRATION_MS_PER_TPS: u32 = 2;
    pub const VIBRATION_MAX_MS: u32 = 50;
}

/// Effect intensity level (1..=10) for a TPS reading
#[inline]
pub fn tps_level(tps: u32) -> u32 {
    let level = (tps as f64 / consts::TPS_SPEED_STEP).floor() as u32 + 1;
    level.clamp(1, consts::TPS_MAX_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tps_level_buckets() {
        assert_eq!(tps_level(0), 1);
        assert_eq!(tps_level(1), 3);
        assert_eq!(tps_level(4), 9);
        assert_eq!(tps_level(5), 10);
        assert_eq!(tps_level(40), 10);
    }
}
