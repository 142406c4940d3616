//! Deadline-based interval timers
//!
//! The host drives time through `GameEngine::poll`; this module only keeps
//! deadlines. A cancelled timer has no deadline and cannot fire.

use crate::consts::{BROADCAST_INTERVAL_MS, COUNTDOWN_INTERVAL_MS, TPS_SAMPLE_INTERVAL_MS};

/// The engine's periodic callbacks, in creation (tie-break) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    /// One second of game time
    Countdown,
    /// Scores/time/TPS broadcast to the UI
    Broadcast,
    /// TPS window recompute
    TpsSample,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [TimerKind::Countdown, TimerKind::Broadcast, TimerKind::TpsSample];

    pub fn period_ms(&self) -> u64 {
        match self {
            TimerKind::Countdown => COUNTDOWN_INTERVAL_MS,
            TimerKind::Broadcast => BROADCAST_INTERVAL_MS,
            TimerKind::TpsSample => TPS_SAMPLE_INTERVAL_MS,
        }
    }

    /// Whether missed periods are delivered one by one (true) or merged
    fn catches_up(&self) -> bool {
        matches!(self, TimerKind::Countdown)
    }

    fn index(&self) -> usize {
        match self {
            TimerKind::Countdown => 0,
            TimerKind::Broadcast => 1,
            TimerKind::TpsSample => 2,
        }
    }
}

/// A timer firing: which one, and the deadline it fired for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub kind: TimerKind,
    pub due_ms: u64,
}

/// The set of engine timers
#[derive(Debug, Clone, Default)]
pub struct Timers {
    next_due: [Option<u64>; 3],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start a timer; first fire one period after `now_ms`
    pub fn start(&mut self, kind: TimerKind, now_ms: u64) {
        self.next_due[kind.index()] = Some(now_ms + kind.period_ms());
    }

    pub fn start_all(&mut self, now_ms: u64) {
        for kind in TimerKind::ALL {
            self.start(kind, now_ms);
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.next_due[kind.index()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.next_due = [None; 3];
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.next_due[kind.index()].is_some()
    }

    pub fn active_count(&self) -> usize {
        self.next_due.iter().filter(|d| d.is_some()).count()
    }

    pub fn next_due(&self, kind: TimerKind) -> Option<u64> {
        self.next_due[kind.index()]
    }

    /// Pop the earliest timer due at `now_ms` and schedule its next deadline
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Firing> {
        let kind = TimerKind::ALL
            .into_iter()
            .filter_map(|k| self.next_due(k).map(|due| (due, k)))
            .filter(|&(due, _)| due <= now_ms)
            .min()
            .map(|(_, k)| k)?;

        let due_ms = self.next_due[kind.index()]?;
        let period = kind.period_ms();
        let mut next = due_ms + period;
        if !kind.catches_up() && next <= now_ms {
            // Skip the missed periods, keeping the same phase
            let missed = (now_ms - next) / period + 1;
            next += missed * period;
        }
        self.next_due[kind.index()] = Some(next);

        Some(Firing { kind, due_ms })
    }
}
