// shelby Copyright (c) 2023 Evan Overman (https://an-prata.it).
// Licensed under the MIT License.
// See LICENSE file in repository root for complete license text.

use crate::hardware::Timebase;
use std::time::Duration;

/// A periodic delay that ticks at a regular rate regardless of how long each
/// loop iteration took, by sleeping only for what is left of the period. This
/// is a ceiling on the loop rate, not a real time guarantee: an iteration
/// that overruns the period simply does not sleep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metronome {
    /// When the current period started.
    mark: Duration,
}

impl Metronome {
    /// Creates a metronome whose first period starts now.
    #[must_use]
    pub fn new(time: &impl Timebase) -> Self {
        Self {
            mark: time.elapsed(),
        }
    }

    /// Restarts the current period.
    pub fn reset(&mut self, time: &impl Timebase) {
        self.mark = time.elapsed();
    }

    /// Sleeps for the remainder of `period` and starts the next one. Returns
    /// how long it slept.
    pub fn wait_for_tick(&mut self, time: &mut impl Timebase, period: Duration) -> Duration {
        let spent = time.elapsed().saturating_sub(self.mark);
        let remaining = period.saturating_sub(spent);

        if !remaining.is_zero() {
            time.sleep(remaining);
        }

        self.mark = time.elapsed();
        remaining
    }
}
