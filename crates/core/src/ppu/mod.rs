//! PPU Program Execution Controller.
//!
//! This module composes bounded batch submissions into a complete program run. It
//! provides:
//! 1. **Image Loader:** Reset, symbol zero-fill, program write and run release in one batch.
//! 2. **Run/Halt State Controller:** Single-command control register writes.
//! 3. **Completion Poller:** Fixed-step status polling under an optional cycle budget.
//! 4. **Result Collector:** Halt plus read-back of the exit code and the mailbox.
//!
//! The stages share nothing but the executor and the processor identifier passed by the
//! caller. The caller serializes all interaction with one processor.

/// Result Collector.
pub mod collect;

/// Run/Halt State Controller.
pub mod control;

/// Image Loader.
pub mod loader;

/// Completion Poller.
pub mod poll;

pub use collect::{ExitCode, ProgramResult, StopSequence, StopTickets, collect_result};
pub use control::{set_reset, set_running};
pub use loader::{LoadSequence, load};
pub use poll::{PollSequence, await_completion};

use std::path::Path;

use tracing::info;

use crate::channel::Executor;
use crate::common::{CollectError, ConfigError, Error, LoadError, PpuId, WaitError};
use crate::config::Config;
use crate::image::ElfImage;

/// Entry point for load, await and stop.
///
/// Holds only configuration; every call names its processor explicitly, so one controller
/// serves any number of processors one after another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Creates a controller after validating `config`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the executable at `path` and loads it onto `ppu`, starting execution.
    ///
    /// # Arguments
    ///
    /// * `executor` - Channel to the target.
    /// * `path` - Unstripped ELF executable.
    /// * `ppu` - Target processor.
    pub fn load_and_start<E: Executor + ?Sized>(
        &self,
        executor: &mut E,
        path: impl AsRef<Path>,
        ppu: PpuId,
    ) -> Result<(), LoadError> {
        let path = path.as_ref();
        info!(%ppu, path = %path.display(), "loading program");
        let elf = ElfImage::open(path)?;
        let image = elf.read_program()?;
        let symbols = elf.read_symbols()?;
        load(executor, &image, &symbols, ppu)
    }

    /// Waits for the program on `ppu` to finish.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the PPU sleeps; `WaitError::Timeout` after `timeout_cycles` elapsed.
    pub fn await_completion<E: Executor + ?Sized>(
        &self,
        executor: &mut E,
        timeout_cycles: Option<u64>,
        ppu: PpuId,
    ) -> Result<(), WaitError> {
        await_completion(
            executor,
            ppu,
            timeout_cycles,
            self.config.timing.poll_wait_cycles,
        )
    }

    /// Halts `ppu` and collects its exit code and, if `read_mailbox`, its mailbox text.
    pub fn stop<E: Executor + ?Sized>(
        &self,
        executor: &mut E,
        read_mailbox: bool,
        ppu: PpuId,
    ) -> Result<ProgramResult, CollectError> {
        collect_result(
            executor,
            ppu,
            read_mailbox,
            self.config.timing.settle_wait_cycles,
        )
    }

    /// Runs the program at `path` end to end with the `run` configuration.
    ///
    /// A nonzero exit code is part of the returned result, not an error.
    pub fn run_program<E: Executor + ?Sized>(
        &self,
        executor: &mut E,
        path: impl AsRef<Path>,
    ) -> Result<ProgramResult, Error> {
        let run = &self.config.run;
        let ppu = run.ppu_id()?;
        self.load_and_start(executor, path, ppu)?;
        self.await_completion(executor, run.timeout_cycles, ppu)?;
        Ok(self.stop(executor, run.print_mailbox, ppu)?)
    }
}
