//! Configuration for the execution controller.
//!
//! This module defines the configuration structures used to parameterize the controller.
//! It provides:
//! 1. **Defaults:** Wait durations and run defaults matching the hardware setup.
//! 2. **Structures:** `TimingConfig` for the target-side waits, `RunConfig` for the
//!    command-line entry point.
//! 3. **Loading:** JSON deserialization and validation.
//!
//! Every field may be omitted from the JSON input and falls back to its default.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::{
    DEFAULT_POLL_WAIT_CYCLES, DEFAULT_SETTLE_WAIT_CYCLES, DEFAULT_TIMEOUT_CYCLES,
};
use crate::common::{ConfigError, PpuId};

/// Default configuration constants.
mod defaults {
    use super::{DEFAULT_POLL_WAIT_CYCLES, DEFAULT_SETTLE_WAIT_CYCLES, DEFAULT_TIMEOUT_CYCLES};

    /// Cycles each completion poll waits on the target side.
    ///
    /// Every batch costs a roughly constant round trip, so polling in coarse fixed steps
    /// keeps the number of round trips low without overshooting completion by much.
    pub const POLL_WAIT_CYCLES: u32 = DEFAULT_POLL_WAIT_CYCLES;

    /// Cycles the stop batch waits so that its read responses have been produced.
    pub const SETTLE_WAIT_CYCLES: u32 = DEFAULT_SETTLE_WAIT_CYCLES;

    /// Cycle budget for program completion.
    pub const TIMEOUT_CYCLES: Option<u64> = Some(DEFAULT_TIMEOUT_CYCLES);

    /// PPU instance addressed when none is given.
    pub const PPU: u8 = 0;

    /// Whether the mailbox is read back and printed after the program stopped.
    pub const PRINT_MAILBOX: bool = true;
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Target-side wait durations.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Defaults for complete load/await/stop runs.
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Returns
    ///
    /// `Ok(())` if both wait durations are positive and `run.ppu` exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.poll_wait_cycles == 0 {
            return Err(ConfigError::ZeroPollWait);
        }
        if self.timing.settle_wait_cycles == 0 {
            return Err(ConfigError::ZeroSettleWait);
        }
        let _ = self.run.ppu_id()?;
        Ok(())
    }
}

/// Target-side wait durations, in FPGA cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Timer value every poll iteration waits for.
    #[serde(default = "TimingConfig::default_poll_wait_cycles")]
    pub poll_wait_cycles: u32,

    /// Timer value the stop batch waits for after issuing its reads.
    #[serde(default = "TimingConfig::default_settle_wait_cycles")]
    pub settle_wait_cycles: u32,
}

impl TimingConfig {
    fn default_poll_wait_cycles() -> u32 {
        defaults::POLL_WAIT_CYCLES
    }

    fn default_settle_wait_cycles() -> u32 {
        defaults::SETTLE_WAIT_CYCLES
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_wait_cycles: defaults::POLL_WAIT_CYCLES,
            settle_wait_cycles: defaults::SETTLE_WAIT_CYCLES,
        }
    }
}

/// Defaults for a complete program run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Cycle budget for completion; `null` waits forever.
    #[serde(default = "RunConfig::default_timeout_cycles")]
    pub timeout_cycles: Option<u64>,

    /// PPU instance number.
    #[serde(default = "RunConfig::default_ppu")]
    pub ppu: u8,

    /// Read back and print the mailbox after stopping.
    #[serde(default = "RunConfig::default_print_mailbox")]
    pub print_mailbox: bool,
}

impl RunConfig {
    fn default_timeout_cycles() -> Option<u64> {
        defaults::TIMEOUT_CYCLES
    }

    fn default_ppu() -> u8 {
        defaults::PPU
    }

    fn default_print_mailbox() -> bool {
        defaults::PRINT_MAILBOX
    }

    /// The configured PPU as a validated identifier.
    pub fn ppu_id(&self) -> Result<PpuId, ConfigError> {
        Ok(PpuId::new(self.ppu)?)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_cycles: defaults::TIMEOUT_CYCLES,
            ppu: defaults::PPU,
            print_mailbox: defaults::PRINT_MAILBOX,
        }
    }
}
