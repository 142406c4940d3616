//! Game session engine
//!
//! All session logic lives here. No platform dependencies:
//! - Time comes from a `Clock`, timers fire only from `poll`
//! - Output is events and feedback cues, never direct I/O

pub mod events;
pub mod game;
pub mod state;
pub mod timers;
pub mod tps;

#[cfg(test)]
mod properties;

pub use events::{EventBus, EventKind, GameEvent, ListenerId};
pub use game::GameEngine;
pub use state::{GameMode, GameRecord, GameSnapshot, Outcome, Scores, SessionPhase, Statistics};
pub use timers::{TimerKind, Timers};
pub use tps::TapWindow;

pub use crate::input::Participant;
