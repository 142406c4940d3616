//! Persistence for settings, game history and high scores
//!
//! Values are JSON strings under fixed `bunny_click_*` keys. A backend only
//! provides raw key/value access; the game-level operations are built on top
//! of it. The engine never awaits any of this: the host drains finished
//! records and hands them to [`persist_record`].

#[cfg(target_arch = "wasm32")]
mod local;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::engine::{GameMode, GameRecord};
use crate::error::StorageError;
use crate::highscores::HighScores;
use crate::settings::Settings;

/// Most recent records kept in the history list
pub const MAX_HISTORY: usize = 100;

pub const HISTORY_KEY: &str = "bunny_click_history";
const HIGH_SCORES_PREFIX: &str = "bunny_click_highscores_";

/// Key of the leaderboard for `mode`
pub fn high_score_key(mode: GameMode) -> String {
    format!("{}{}", HIGH_SCORES_PREFIX, mode.as_str())
}

/// Async game storage over a string key/value backend
#[allow(async_fn_in_trait)]
pub trait GameStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Stored settings, `None` if nothing was saved yet
    async fn get_settings(&self) -> Result<Option<Settings>, StorageError> {
        Ok(read_json::<_, Settings>(self, Settings::STORAGE_KEY)?.map(Settings::sanitized))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        write_json(self, Settings::STORAGE_KEY, settings)
    }

    /// Append a finished session, keeping the newest [`MAX_HISTORY`]
    async fn save_game_history(&self, record: &GameRecord) -> Result<(), StorageError> {
        let mut history: Vec<GameRecord> = read_json(self, HISTORY_KEY)?.unwrap_or_default();
        history.push(record.clone());
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
        write_json(self, HISTORY_KEY, &history)
    }

    /// Oldest first
    async fn get_game_history(&self) -> Result<Vec<GameRecord>, StorageError> {
        Ok(read_json(self, HISTORY_KEY)?.unwrap_or_default())
    }

    /// Offer a score to the mode's leaderboard. Returns the rank reached.
    async fn save_high_score(
        &self,
        mode: GameMode,
        score: u32,
        tps: u32,
        timestamp: u64,
    ) -> Result<Option<usize>, StorageError> {
        let key = high_score_key(mode);
        let mut board: HighScores = read_json(self, &key)?.unwrap_or_default();
        let rank = board.add_score(score, tps, timestamp);
        if rank.is_some() {
            write_json(self, &key, &board)?;
        }
        Ok(rank)
    }

    async fn get_high_score(&self, mode: GameMode) -> Result<HighScores, StorageError> {
        Ok(read_json(self, &high_score_key(mode))?.unwrap_or_default())
    }

    /// Drop history and leaderboards. Settings survive.
    async fn clear_game_data(&self) -> Result<(), StorageError> {
        self.remove(HISTORY_KEY)?;
        for mode in [GameMode::Single, GameMode::Dual] {
            self.remove(&high_score_key(mode))?;
        }
        Ok(())
    }
}

fn read_json<S, T>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: GameStorage + ?Sized,
    T: DeserializeOwned,
{
    match storage.read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn write_json<S, T>(storage: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: GameStorage + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    storage.write(key, &json)
}

/// Stored settings, or defaults if there are none or the load fails
pub async fn load_settings<S: GameStorage>(storage: &S) -> Settings {
    match storage.get_settings().await {
        Ok(Some(settings)) => {
            info!("Loaded settings from storage");
            settings
        }
        Ok(None) => {
            info!("Using default settings");
            Settings::default()
        }
        Err(e) => {
            warn!("Settings load failed, using defaults: {}", e);
            Settings::default()
        }
    }
}

/// Save a finished session to history and its mode's leaderboard.
/// Failures are logged and swallowed.
pub async fn persist_record<S: GameStorage>(storage: &S, record: &GameRecord) {
    if let Err(e) = storage.save_game_history(record).await {
        warn!("Failed to save game history: {}", e);
    }

    let score = record.best_score();
    match storage
        .save_high_score(record.mode, score, record.best_tps, record.timestamp)
        .await
    {
        Ok(Some(rank)) => info!("New {} high score #{}: {}", record.mode, rank, score),
        Ok(None) => {}
        Err(e) => warn!("Failed to save high score: {}", e),
    }
}

/// In-process storage for native builds and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose every operation fails with `Unavailable`
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.set_failing(true);
        storage
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.get() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl GameStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
