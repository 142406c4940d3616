//! Audio/visual feedback cues
//!
//! The engine does not make sound or draw particles. It hands [`Cue`]s to
//! whatever [`FeedbackSink`]s the host installs and never waits on them.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::input::ClickData;
use crate::settings::Settings;
use crate::tps_level;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEffect {
    /// Session started
    GameStart,
    /// A tap landed
    Click,
    /// Session finished
    GameEnd,
}

/// One fire-and-forget notification for an effects collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum Cue {
    Sound { effect: SoundEffect, volume: f32 },
    Vibrate { millis: u32 },
    Ripple { position: Vec2 },
    Burst { position: Vec2, level: u32 },
}

/// Receiver of feedback cues (audio, haptics, particles)
pub trait FeedbackSink {
    fn cue(&mut self, cue: Cue);
}

impl<F: FnMut(Cue)> FeedbackSink for F {
    fn cue(&mut self, cue: Cue) {
        self(cue)
    }
}

/// Click volume rises with TPS
pub fn click_volume(tps: u32) -> f32 {
    let bonus = (tps as f32 * CLICK_VOLUME_PER_TPS).min(CLICK_MAX_TPS_BONUS);
    (CLICK_BASE_VOLUME + bonus).min(1.0)
}

/// Haptic pulse length for a tap at `tps`
pub fn vibration_ms(tps: u32) -> u32 {
    tps.saturating_mul(VIBRATION_MS_PER_TPS).min(VIBRATION_MAX_MS)
}

/// Sound cue for a session-level effect, if sound is on
pub fn sound_cue(settings: &Settings, effect: SoundEffect) -> Option<Cue> {
    settings.sound_enabled.then_some(Cue::Sound {
        effect,
        volume: 1.0,
    })
}

/// Cues for one registered tap, in delivery order
pub fn tap_cues(settings: &Settings, tps: u32, click: &ClickData) -> Vec<Cue> {
    let mut cues = Vec::with_capacity(4);

    if settings.sound_enabled {
        cues.push(Cue::Sound {
            effect: SoundEffect::Click,
            volume: click_volume(tps),
        });
    }
    if settings.ripple_enabled {
        cues.push(Cue::Ripple {
            position: click.position,
        });
    }
    if settings.effects_enabled {
        cues.push(Cue::Burst {
            position: click.position,
            level: tps_level(tps),
        });
    }
    if settings.vibration_enabled {
        let millis = vibration_ms(tps);
        if millis > 0 {
            cues.push(Cue::Vibrate { millis });
        }
    }

    cues
}
