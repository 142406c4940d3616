//! Sliding-window taps-per-second measurement
//!
//! TPS is sampled: the window is pruned and counted on the 100 ms timer and
//! on each tap, so a reading can lag the exact rate by up to one sample.

use std::collections::VecDeque;

use crate::consts::TPS_WINDOW_MS;

/// Recent tap timestamps (ms), oldest first
#[derive(Debug, Clone, Default)]
pub struct TapWindow {
    taps: VecDeque<u64>,
    current: u32,
}

impl TapWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now_ms: u64) {
        self.taps.push_back(now_ms);
    }

    /// Drop taps at or before `now - window` and refresh the reading
    pub fn sample(&mut self, now_ms: u64) -> u32 {
        if let Some(cutoff) = now_ms.checked_sub(TPS_WINDOW_MS) {
            while self.taps.front().is_some_and(|&t| t <= cutoff) {
                self.taps.pop_front();
            }
        }
        self.current = self.taps.len() as u32;
        self.current
    }

    /// Reading from the last sample
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Unpruned entries (taps since the last sample included)
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn clear(&mut self) {
        self.taps.clear();
        self.current = 0;
    }
}
