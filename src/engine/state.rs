//! Session state and snapshot types

use serde::{Deserialize, Serialize};

use crate::input::Participant;
use crate::settings::Settings;

/// Single player or two local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Single,
    Dual,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Single => "single",
            GameMode::Dual => "dual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "single" => Some(GameMode::Single),
            "dual" => Some(GameMode::Dual),
            _ => None,
        }
    }

    /// Whether taps from `participant` count in this mode
    pub fn accepts(&self, participant: Participant) -> bool {
        match self {
            GameMode::Single => participant == Participant::Single,
            GameMode::Dual => matches!(participant, Participant::Player1 | Participant::Player2),
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Fresh, never started since the last reset
    #[default]
    Idle,
    /// Timers running, taps counted
    Playing,
    /// Started but suspended; timers stopped
    Paused,
    /// Finished by exit or timeout
    Ended,
}

impl SessionPhase {
    pub fn is_playing(&self) -> bool {
        *self == SessionPhase::Playing
    }

    pub fn has_started(&self) -> bool {
        *self != SessionPhase::Idle
    }

    /// Playing or paused: a session that has not been finished yet
    pub fn in_session(&self) -> bool {
        matches!(self, SessionPhase::Playing | SessionPhase::Paused)
    }
}

/// Tap counts per participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub single: u32,
    pub player1: u32,
    pub player2: u32,
}

impl Scores {
    pub fn get(&self, participant: Participant) -> u32 {
        match participant {
            Participant::Single => self.single,
            Participant::Player1 => self.player1,
            Participant::Player2 => self.player2,
        }
    }

    /// Add one tap, returning the new count
    pub fn increment(&mut self, participant: Participant) -> u32 {
        let slot = match participant {
            Participant::Single => &mut self.single,
            Participant::Player1 => &mut self.player1,
            Participant::Player2 => &mut self.player2,
        };
        *slot = slot.saturating_add(1);
        *slot
    }

    pub fn total(&self) -> u32 {
        self.single + self.player1 + self.player2
    }
}

/// Lifetime counters, independent of any one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_clicks: u64,
    /// Seconds
    pub total_play_time: u64,
    pub highest_tps: u32,
    pub games_played: u32,
}

/// Immutable copy of the engine state handed to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub mode: GameMode,
    pub phase: SessionPhase,
    pub is_playing: bool,
    pub has_started: bool,
    pub is_paused: bool,
    pub time_left: u32,
    /// Length the running session started with; `time_left` never exceeds
    /// it, even after `settings.game_duration` changes mid-session
    pub session_duration: u32,
    pub scores: Scores,
    pub settings: Settings,
    pub statistics: Statistics,
    #[serde(rename = "currentTPS")]
    pub current_tps: u32,
    pub tps_level: u32,
}

/// How a finished session came out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Solo { score: u32 },
    Winner { participant: Participant },
    Tie,
}

/// Result of a finished session, handed to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub mode: GameMode,
    pub scores: Scores,
    /// TPS at the moment the session ended
    pub tps: u32,
    /// Peak TPS during the session
    #[serde(alias = "best_tps")]
    pub best_tps: u32,
    /// Seconds actually played
    pub duration: u32,
    /// Unix timestamp (ms)
    pub timestamp: u64,
}

impl GameRecord {
    pub fn outcome(&self) -> Outcome {
        match self.mode {
            GameMode::Single => Outcome::Solo {
                score: self.scores.single,
            },
            GameMode::Dual => {
                let (p1, p2) = (self.scores.player1, self.scores.player2);
                if p1 > p2 {
                    Outcome::Winner {
                        participant: Participant::Player1,
                    }
                } else if p2 > p1 {
                    Outcome::Winner {
                        participant: Participant::Player2,
                    }
                } else {
                    Outcome::Tie
                }
            }
        }
    }

    /// Score that goes on the leaderboard for this mode
    pub fn best_score(&self) -> u32 {
        match self.mode {
            GameMode::Single => self.scores.single,
            GameMode::Dual => self.scores.player1.max(self.scores.player2),
        }
    }
}
