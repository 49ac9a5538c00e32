//! PPU Control and Status Registers.
//!
//! # Control register
//!
//! * bit 0: `inhibit_reset` (set = run, cleared = held in reset)
//! * bit 1: `force_clock_on`
//! * bit 2: `force_clock_off`
//! * bits 3-31: ignored
//!
//! # Status register
//!
//! * any nonzero value: `sleep` (the program has finished and the core is idle)

use super::Container;

const INHIBIT_RESET_BIT: u32 = 1 << 0;
const FORCE_CLOCK_ON_BIT: u32 = 1 << 1;
const FORCE_CLOCK_OFF_BIT: u32 = 1 << 2;
const CONTROL_MASK: u32 = 0b111;

/// Control register of one PPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PpuControlRegister {
    inhibit_reset: bool,
    force_clock_on: bool,
    force_clock_off: bool,
}

impl PpuControlRegister {
    /// Register value holding the PPU in reset. Also used to end a finished program.
    pub const fn held_in_reset() -> Self {
        Self {
            inhibit_reset: false,
            force_clock_on: false,
            force_clock_off: false,
        }
    }

    /// Register value releasing the reset, which starts execution at word 0.
    pub const fn running() -> Self {
        Self {
            inhibit_reset: true,
            force_clock_on: false,
            force_clock_off: false,
        }
    }

    /// Returns whether reset is inhibited, i.e. whether the PPU runs.
    pub const fn inhibit_reset(&self) -> bool {
        self.inhibit_reset
    }

    /// Sets the reset-inhibit flag.
    pub const fn set_inhibit_reset(&mut self, value: bool) {
        self.inhibit_reset = value;
    }

    /// Returns whether the clock is forced on.
    pub const fn force_clock_on(&self) -> bool {
        self.force_clock_on
    }

    /// Sets the force-clock-on flag.
    pub const fn set_force_clock_on(&mut self, value: bool) {
        self.force_clock_on = value;
    }

    /// Returns whether the clock is forced off.
    pub const fn force_clock_off(&self) -> bool {
        self.force_clock_off
    }

    /// Sets the force-clock-off flag.
    pub const fn set_force_clock_off(&mut self, value: bool) {
        self.force_clock_off = value;
    }
}

impl Container for PpuControlRegister {
    fn encode(&self) -> Vec<u32> {
        let mut raw = 0;
        if self.inhibit_reset {
            raw |= INHIBIT_RESET_BIT;
        }
        if self.force_clock_on {
            raw |= FORCE_CLOCK_ON_BIT;
        }
        if self.force_clock_off {
            raw |= FORCE_CLOCK_OFF_BIT;
        }
        vec![raw]
    }

    fn decode(words: &[u32]) -> Self {
        let raw = words.first().copied().unwrap_or(0) & CONTROL_MASK;
        Self {
            inhibit_reset: raw & INHIBIT_RESET_BIT != 0,
            force_clock_on: raw & FORCE_CLOCK_ON_BIT != 0,
            force_clock_off: raw & FORCE_CLOCK_OFF_BIT != 0,
        }
    }
}

/// Status register of one PPU. Read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PpuStatusRegister {
    sleep: bool,
}

impl PpuStatusRegister {
    /// Creates a status value; mostly useful for target models.
    pub const fn new(sleep: bool) -> Self {
        Self { sleep }
    }

    /// Returns whether the PPU has gone to sleep, i.e. the program finished.
    pub const fn sleep(&self) -> bool {
        self.sleep
    }
}

impl Container for PpuStatusRegister {
    fn encode(&self) -> Vec<u32> {
        vec![u32::from(self.sleep)]
    }

    fn decode(words: &[u32]) -> Self {
        Self {
            sleep: words.first().is_some_and(|&raw| raw != 0),
        }
    }
}
