//! The game session engine
//!
//! Owns the one live session. The host feeds it taps and key presses and
//! calls [`GameEngine::poll`] regularly; the engine answers with events to
//! listeners and cues to feedback sinks.

use std::collections::VecDeque;

use log::{debug, info, warn};

use super::events::{EventBus, EventKind, GameEvent, ListenerId};
use super::state::{GameMode, GameRecord, GameSnapshot, Scores, SessionPhase, Statistics};
use super::timers::{TimerKind, Timers};
use super::tps::TapWindow;
use crate::clock::{Clock, SystemClock};
use crate::error::{EngineError, StorageError};
use crate::feedback::{self, Cue, FeedbackSink, SoundEffect};
use crate::input::{ClickData, Key, Participant};
use crate::settings::Settings;
use crate::storage::MAX_HISTORY;
use crate::tps_level;

/// Game session engine
pub struct GameEngine<C: Clock = SystemClock> {
    clock: C,
    phase: SessionPhase,
    mode: GameMode,
    time_left: u32,
    /// Duration the current session started with
    session_duration: u32,
    scores: Scores,
    settings: Settings,
    statistics: Statistics,
    taps: TapWindow,
    session_best_tps: u32,
    timers: Timers,
    events: EventBus,
    sinks: Vec<Box<dyn FeedbackSink>>,
    /// Finished sessions waiting to be persisted
    records: VecDeque<GameRecord>,
}

impl<C: Clock> GameEngine<C> {
    /// Create an idle engine with default settings
    pub fn new(clock: C) -> Self {
        Self::with_settings(clock, Settings::default())
    }

    pub fn with_settings(clock: C, settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            clock,
            phase: SessionPhase::Idle,
            mode: GameMode::Single,
            time_left: settings.game_duration,
            session_duration: settings.game_duration,
            scores: Scores::default(),
            settings,
            statistics: Statistics::default(),
            taps: TapWindow::new(),
            session_best_tps: 0,
            timers: Timers::new(),
            events: EventBus::new(),
            sinks: Vec::new(),
            records: VecDeque::new(),
        }
    }

    // === Listeners and sinks ===

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.events.on(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn add_feedback_sink(&mut self, sink: impl FeedbackSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    // === Settings ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Install new settings. A running session keeps the duration it started
    /// with, so `time_left` may exceed the new `game_duration` until the next
    /// start; snapshots report that length as `session_duration`.
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        if self.phase == SessionPhase::Idle {
            self.time_left = settings.game_duration;
        }
        info!(
            "Settings applied ({}s, {})",
            settings.game_duration,
            settings.difficulty.as_str()
        );
        self.settings = settings;
    }

    /// Completion of the async settings load
    pub fn settings_loaded(&mut self, result: Result<Settings, StorageError>) {
        match result {
            Ok(settings) => self.apply_settings(settings),
            Err(e) => warn!("Settings load failed, using defaults: {}", e),
        }
    }

    // === Session lifecycle ===

    pub fn start_single_player(&mut self) -> Result<(), EngineError> {
        self.start(GameMode::Single)
    }

    pub fn start_dual_player(&mut self) -> Result<(), EngineError> {
        self.start(GameMode::Dual)
    }

    fn start(&mut self, mode: GameMode) -> Result<(), EngineError> {
        if self.phase.in_session() {
            warn!(
                "Refusing to start {} session: {} session in progress",
                mode, self.mode
            );
            return Err(EngineError::AlreadyPlaying { mode: self.mode });
        }

        let now = self.clock.now_ms();
        self.clear_session();
        self.mode = mode;
        self.phase = SessionPhase::Playing;
        self.timers.start_all(now);

        info!("Started {} session ({}s)", mode, self.session_duration);
        if let Some(cue) = feedback::sound_cue(&self.settings, SoundEffect::GameStart) {
            self.cue(cue);
        }
        self.emit(GameEvent::SessionStarted { mode });
        Ok(())
    }

    /// Register a tap. Returns the participant's new score, or `None` if the
    /// tap was dropped (not playing, or participant not in this mode).
    pub fn handle_click(&mut self, participant: Participant, click: ClickData) -> Option<u32> {
        if !self.phase.is_playing() {
            debug!("Tap ignored while {:?}", self.phase);
            return None;
        }
        if !self.mode.accepts(participant) {
            warn!("Ignoring tap from {} in {} mode", participant, self.mode);
            return None;
        }

        let now = self.clock.now_ms();
        self.taps.record(now);
        let score = self.scores.increment(participant);
        self.statistics.total_clicks += 1;
        let tps = self.sample_tps(now);

        if !self.sinks.is_empty() && self.settings.any_tap_feedback() {
            for cue in feedback::tap_cues(&self.settings, tps, &click) {
                self.cue(cue);
            }
        }

        self.emit(GameEvent::TapRegistered {
            participant,
            score,
            tps,
            click_data: click,
        });
        Some(score)
    }

    /// Register a tap by raw participant key
    pub fn handle_click_key(&mut self, key: &str, click: ClickData) -> Option<u32> {
        match Participant::from_key(key) {
            Some(participant) => self.handle_click(participant, click),
            None => {
                warn!("Ignoring tap from unknown participant {:?}", key);
                None
            }
        }
    }

    /// Keyboard shortcuts: Escape exits, Space starts a solo game
    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Escape if self.phase.is_playing() => self.exit_game(),
            Key::Space if !self.phase.in_session() => {
                // Cannot fail outside a session
                let _ = self.start_single_player();
            }
            _ => {}
        }
    }

    /// Suspend the running session; scores, time and taps are kept
    pub fn pause(&mut self) {
        if !self.phase.is_playing() {
            debug!("Pause ignored while {:?}", self.phase);
            return;
        }
        self.timers.cancel_all();
        self.phase = SessionPhase::Paused;
        info!("Paused with {}s left", self.time_left);
        self.emit(GameEvent::SessionPaused);
    }

    /// Continue a paused session. The tap window starts empty so paused time
    /// does not show up as a TPS spike.
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Paused {
            debug!("Resume ignored while {:?}", self.phase);
            return;
        }
        let now = self.clock.now_ms();
        self.taps.clear();
        self.phase = SessionPhase::Playing;
        self.timers.start_all(now);
        info!("Resumed with {}s left", self.time_left);
        self.emit(GameEvent::SessionResumed);
    }

    /// End the session (manual exit or timeout). Repeat calls only re-emit
    /// `SessionExited`.
    pub fn exit_game(&mut self) {
        if self.phase.in_session() {
            self.finish_session();
        }
        self.emit(GameEvent::SessionExited);
    }

    fn finish_session(&mut self) {
        let now = self.clock.now_ms();
        self.timers.cancel_all();
        let tps = self.sample_tps(now);
        self.phase = SessionPhase::Ended;

        let duration = self.session_duration.saturating_sub(self.time_left);
        self.statistics.games_played += 1;
        self.statistics.total_play_time += duration as u64;

        let record = GameRecord {
            mode: self.mode,
            scores: self.scores,
            tps,
            best_tps: self.session_best_tps,
            duration,
            timestamp: now,
        };
        info!(
            "Session ended: {} mode, {:?}, {}s played",
            record.mode,
            record.outcome(),
            duration
        );
        if self.records.len() >= MAX_HISTORY {
            warn!("Dropping oldest unsaved game record");
            self.records.pop_front();
        }
        self.records.push_back(record);

        // Final broadcast so listeners hold the end-of-game scores
        self.emit(GameEvent::Update {
            scores: self.scores,
            time_left: self.time_left,
            tps,
        });
        if let Some(cue) = feedback::sound_cue(&self.settings, SoundEffect::GameEnd) {
            self.cue(cue);
        }
        self.emit(GameEvent::SessionEnded {
            mode: self.mode,
            scores: self.scores,
            tps,
        });
    }

    /// Back to a fresh idle state. Settings and statistics are kept.
    pub fn reset_game(&mut self) {
        self.clear_session();
        self.phase = SessionPhase::Idle;
        debug!("Session reset");
        self.emit(GameEvent::SessionReset);
    }

    fn clear_session(&mut self) {
        self.timers.cancel_all();
        self.scores = Scores::default();
        self.session_duration = self.settings.game_duration;
        self.time_left = self.session_duration;
        self.taps.clear();
        self.session_best_tps = 0;
    }

    /// Discard any session in progress and drop every listener and sink.
    /// Nothing is recorded for the discarded session.
    pub fn destroy(&mut self) {
        self.clear_session();
        self.phase = SessionPhase::Idle;
        self.events.clear();
        self.sinks.clear();
        info!("Engine destroyed");
    }

    // === Timers ===

    /// Fire every timer that is due. Returns the number of firings.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut fired = 0;
        while let Some(firing) = self.timers.pop_due(now) {
            fired += 1;
            match firing.kind {
                TimerKind::Countdown => self.on_countdown(),
                TimerKind::Broadcast => self.on_broadcast(now),
                TimerKind::TpsSample => self.on_tps_sample(now),
            }
        }
        fired
    }

    fn on_countdown(&mut self) {
        if !self.phase.is_playing() || self.time_left == 0 {
            return;
        }
        self.time_left -= 1;
        self.emit(GameEvent::Tick {
            time_left: self.time_left,
        });
        if self.time_left == 0 {
            self.exit_game();
        }
    }

    fn on_broadcast(&mut self, now: u64) {
        if !self.phase.is_playing() {
            return;
        }
        let tps = self.sample_tps(now);
        self.emit(GameEvent::Update {
            scores: self.scores,
            time_left: self.time_left,
            tps,
        });
    }

    fn on_tps_sample(&mut self, now: u64) {
        if self.phase.is_playing() {
            self.sample_tps(now);
        }
    }

    fn sample_tps(&mut self, now: u64) -> u32 {
        let tps = self.taps.sample(now);
        self.session_best_tps = self.session_best_tps.max(tps);
        self.statistics.highest_tps = self.statistics.highest_tps.max(tps);
        tps
    }

    // === Reads ===

    pub fn get_state(&self) -> GameSnapshot {
        let current_tps = self.taps.current();
        GameSnapshot {
            mode: self.mode,
            phase: self.phase,
            is_playing: self.phase.is_playing(),
            has_started: self.phase.has_started(),
            is_paused: self.phase == SessionPhase::Paused,
            time_left: self.time_left,
            session_duration: self.session_duration,
            scores: self.scores,
            settings: self.settings.clone(),
            statistics: self.statistics,
            current_tps,
            tps_level: tps_level(current_tps),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Drain finished sessions for persistence
    pub fn take_records(&mut self) -> Vec<GameRecord> {
        self.records.drain(..).collect()
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.emit(&event);
    }

    fn cue(&mut self, cue: Cue) {
        for sink in &mut self.sinks {
            sink.cue(cue);
        }
    }
}
