//! FPGA timer.
//!
//! Wait commands block playback until the timer reaches a given value. Writing the timer
//! resets its origin, so `write(Timer::new(0))` followed by `wait_until(n)` waits `n` cycles.

use super::Container;

/// Value of the FPGA timer in FPGA clock cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timer(u32);

impl Timer {
    /// Creates a timer value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the cycle count.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl Container for Timer {
    fn encode(&self) -> Vec<u32> {
        vec![self.0]
    }

    fn decode(words: &[u32]) -> Self {
        Self(words.first().copied().unwrap_or(0))
    }
}
