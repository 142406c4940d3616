//! Inbound input from the tap surface and keyboard

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Who tapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    Single,
    Player1,
    Player2,
}

impl Participant {
    pub const ALL: [Participant; 3] = [Participant::Single, Participant::Player1, Participant::Player2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Participant::Single => "single",
            Participant::Player1 => "player1",
            Participant::Player2 => "player2",
        }
    }

    /// Parse a participant key as sent by the tap surface
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "single" => Some(Participant::Single),
            "player1" => Some(Participant::Player1),
            "player2" => Some(Participant::Player2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer data attached to a tap, passed through to effects
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClickData {
    /// Tap position in surface coordinates
    pub position: Vec2,
}

impl ClickData {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

/// Keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Exit a running session
    Escape,
    /// Start a single-player session
    Space,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Escape" => Some(Key::Escape),
            "Space" => Some(Key::Space),
            _ => None,
        }
    }
}
