//! Game settings and preferences
//!
//! Loaded asynchronously from the storage collaborator; the engine runs on
//! defaults until (and unless) that load succeeds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{DEFAULT_GAME_DURATION, MAX_GAME_DURATION, MIN_GAME_DURATION};

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Feedback ===
    /// Click/start/end sounds
    #[serde(alias = "sound_enabled")]
    pub sound_enabled: bool,
    /// Haptic pulse on each tap
    #[serde(alias = "vibration_enabled")]
    pub vibration_enabled: bool,
    /// Ripple at the tap position
    #[serde(alias = "ripple_enabled")]
    pub ripple_enabled: bool,
    /// Particle bursts scaled by TPS level
    #[serde(alias = "effects_enabled")]
    pub effects_enabled: bool,

    // === Gameplay ===
    /// Session length in seconds
    #[serde(alias = "game_duration")]
    pub game_duration: u32,
    pub difficulty: Difficulty,

    // === Appearance ===
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            ripple_enabled: true,
            effects_enabled: true,

            game_duration: DEFAULT_GAME_DURATION,
            difficulty: Difficulty::Normal,

            theme: "default".to_string(),
        }
    }
}

impl Settings {
    /// Storage key for the settings record
    pub const STORAGE_KEY: &'static str = "bunny_click_settings";

    /// Clamp out-of-range values from storage or the UI
    pub fn sanitized(mut self) -> Self {
        self.game_duration = self.game_duration.clamp(MIN_GAME_DURATION, MAX_GAME_DURATION);
        if self.theme.trim().is_empty() {
            self.theme = "default".to_string();
        }
        self
    }

    /// Overlay a partial JSON record onto these settings. Keys may be
    /// camelCase or snake_case; unknown keys are rejected.
    pub fn merged(&self, patch: &str) -> Result<Settings, serde_json::Error> {
        let patch: Map<String, Value> = serde_json::from_str(patch)?;
        let mut record = match serde_json::to_value(self)? {
            Value::Object(record) => record,
            _ => Map::new(),
        };

        for (key, value) in patch {
            let key = camel_case(&key);
            if !record.contains_key(&key) {
                return Err(serde::de::Error::custom(format!(
                    "unknown settings field `{}`",
                    key
                )));
            }
            record.insert(key, value);
        }

        let merged: Settings = serde_json::from_value(Value::Object(record))?;
        Ok(merged.sanitized())
    }

    /// Whether a tap produces any cue at all
    pub fn any_tap_feedback(&self) -> bool {
        self.sound_enabled || self.vibration_enabled || self.ripple_enabled || self.effects_enabled
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
