//! High score leaderboard
//!
//! One board per game mode, top 10 scores, persisted by the storage
//! collaborator.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Taps in the session
    pub score: u32,
    /// Peak taps per second
    pub tps: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Index a new `score` would take; ties go after existing entries
    fn slot(&self, score: u32) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// Whether `score` would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        score > 0 && self.slot(score) < MAX_HIGH_SCORES
    }

    /// Insert a score, returning its 1-based rank if it made the board
    pub fn add_score(&mut self, score: u32, tps: u32, timestamp: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let slot = self.slot(score);
        self.entries.insert(
            slot,
            HighScoreEntry {
                score,
                tps,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best entry (if any)
    pub fn top(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.top().map(|e| e.score)
    }
}
