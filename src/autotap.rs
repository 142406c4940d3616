//! Seeded tap schedules
//!
//! Stands in for a human tapping at a steady rate: gaps are the nominal
//! period plus bounded random jitter. Same seed, same schedule.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::input::Participant;

/// Largest jitter fraction accepted
pub const MAX_JITTER: f64 = 0.9;

/// Generates tap timestamps for one participant
#[derive(Debug, Clone)]
pub struct AutoTapper {
    participant: Participant,
    /// Nominal gap between taps (ms)
    period_ms: f64,
    /// Each gap is `period * (1 ± jitter)`
    jitter: f64,
    /// Fractional time of the next tap (ms since epoch)
    next_ms: f64,
    rng: Pcg32,
    taps: u64,
}

impl AutoTapper {
    /// Tap `rate` times per second starting at `start_ms`
    pub fn new(participant: Participant, rate: f64, start_ms: u64, seed: u64) -> Self {
        let rate = if rate.is_finite() { rate.clamp(0.1, 1000.0) } else { 1.0 };
        Self {
            participant,
            period_ms: 1000.0 / rate,
            jitter: 0.0,
            next_ms: start_ms as f64,
            rng: Pcg32::seed_from_u64(seed),
            taps: 0,
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_finite() {
            jitter.clamp(0.0, MAX_JITTER)
        } else {
            0.0
        };
        self
    }

    pub fn participant(&self) -> Participant {
        self.participant
    }

    /// Timestamp of the next scheduled tap
    pub fn peek(&self) -> u64 {
        self.next_ms.round() as u64
    }

    /// Taps produced so far
    pub fn taps(&self) -> u64 {
        self.taps
    }

    /// Consume the next tap and schedule the one after
    pub fn next_tap(&mut self) -> u64 {
        let at = self.peek();
        let spread = if self.jitter > 0.0 {
            self.rng.random_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        self.next_ms += self.period_ms * (1.0 + spread);
        self.taps += 1;
        at
    }

    /// Consume every tap scheduled at or before `now`
    pub fn due(&mut self, now: u64) -> Vec<u64> {
        let mut taps = Vec::new();
        while self.peek() <= now {
            taps.push(self.next_tap());
        }
        taps
    }
}
