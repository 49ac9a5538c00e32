//! In-process target model.
//!
//! `SimulatedTarget` executes command batches the way the playback hardware does, without
//! any transport. It provides:
//! 1. **Memory:** One zero-initialized memory of `PPU_MEMORY_WORDS` words per PPU.
//! 2. **Registers:** Control register (write/read) and status register (read-only sleep bit).
//! 3. **Timer:** One FPGA timer; `WaitUntil` advances simulated time.
//! 4. **Firmware:** A pluggable [`Firmware`] per PPU decides when the program sleeps.
//! 5. **History:** Every submitted batch is recorded for inspection.
//!
//! Time only advances through waits. A program whose reset was released at time `t` goes to
//! sleep once time reaches `t + run_cycles`.

/// Program behaviour.
pub mod firmware;

pub use firmware::{Firmware, HaltAfter, NeverHalts};

use tracing::{debug, trace};

use crate::channel::{Command, Executor, Target};
use crate::common::constants::PPU_MEMORY_WORDS;
use crate::common::{ChannelError, PpuId};
use crate::hal::{Container, PpuControlRegister, PpuMemoryBlock, PpuMemoryWord, PpuStatusRegister};

#[derive(Debug)]
struct PpuState {
    memory: PpuMemoryBlock,
    control: PpuControlRegister,
    sleep: bool,
    started_at: Option<u64>,
    firmware: Box<dyn Firmware>,
}

impl PpuState {
    fn new() -> Self {
        Self {
            memory: PpuMemoryBlock::zeroed(usize::from(PPU_MEMORY_WORDS)),
            control: PpuControlRegister::held_in_reset(),
            sleep: false,
            started_at: None,
            firmware: Box::new(NeverHalts),
        }
    }

    fn write_control(&mut self, value: PpuControlRegister, now: u64) {
        if value.inhibit_reset() && !self.control.inhibit_reset() {
            self.started_at = Some(now);
            self.sleep = false;
        } else if !value.inhibit_reset() {
            self.started_at = None;
            self.sleep = false;
        }
        self.control = value;
    }

    fn advance(&mut self, now: u64) -> bool {
        if self.sleep {
            return false;
        }
        let Some(started_at) = self.started_at else {
            return false;
        };
        let Some(cycles) = self.firmware.run_cycles() else {
            return false;
        };
        if started_at.saturating_add(cycles) > now {
            return false;
        }
        self.sleep = true;
        self.firmware.finish(&mut self.memory);
        true
    }
}

/// Executor backed by an in-process PPU model.
#[derive(Debug)]
pub struct SimulatedTarget {
    ppus: Vec<PpuState>,
    now: u64,
    timer_origin: u64,
    history: Vec<Vec<Command>>,
}

impl Default for SimulatedTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTarget {
    /// Creates a target whose PPUs are held in reset and run [`NeverHalts`].
    pub fn new() -> Self {
        Self {
            ppus: PpuId::iter_all().map(|_| PpuState::new()).collect(),
            now: 0,
            timer_origin: 0,
            history: Vec::new(),
        }
    }

    /// Replaces the program behaviour of `ppu`.
    pub fn set_firmware(&mut self, ppu: PpuId, firmware: impl Firmware + 'static) {
        self.ppu_mut(ppu).firmware = Box::new(firmware);
    }

    /// Builder-style [`set_firmware`](Self::set_firmware).
    #[must_use]
    pub fn with_firmware(mut self, ppu: PpuId, firmware: impl Firmware + 'static) -> Self {
        self.set_firmware(ppu, firmware);
        self
    }

    /// Memory of `ppu`.
    pub fn memory(&self, ppu: PpuId) -> &PpuMemoryBlock {
        &self.ppu(ppu).memory
    }

    /// Mutable memory of `ppu`, e.g. to leave stale contents from an earlier run.
    pub fn memory_mut(&mut self, ppu: PpuId) -> &mut PpuMemoryBlock {
        &mut self.ppu_mut(ppu).memory
    }

    /// Last value written to the control register of `ppu`.
    pub fn control(&self, ppu: PpuId) -> PpuControlRegister {
        self.ppu(ppu).control
    }

    /// Returns whether the program on `ppu` has gone to sleep.
    pub fn is_sleeping(&self, ppu: PpuId) -> bool {
        self.ppu(ppu).sleep
    }

    /// Simulated time in cycles.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Every submitted batch, oldest first.
    pub fn history(&self) -> &[Vec<Command>] {
        &self.history
    }

    /// Forgets the recorded batches.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn ppu(&self, ppu: PpuId) -> &PpuState {
        &self.ppus[usize::from(ppu.value())]
    }

    fn ppu_mut(&mut self, ppu: PpuId) -> &mut PpuState {
        &mut self.ppus[usize::from(ppu.value())]
    }

    fn advance(&mut self) {
        let now = self.now;
        for (ppu, state) in PpuId::iter_all().zip(&mut self.ppus) {
            if state.advance(now) {
                debug!(%ppu, now, "simulated program went to sleep");
            }
        }
    }

    fn write(&mut self, target: Target, words: &[u32]) -> Result<(), ChannelError> {
        let expected = target.size_in_words();
        if words.len() != expected {
            return Err(ChannelError::PayloadSize {
                target,
                expected,
                actual: words.len(),
            });
        }

        let now = self.now;
        match target {
            Target::ControlRegister(ppu) => {
                self.ppu_mut(ppu)
                    .write_control(PpuControlRegister::decode(words), now);
            }
            Target::StatusRegister(_) => {
                return Err(ChannelError::Transport(format!("{target} is read-only")));
            }
            Target::MemoryWord(coord) => {
                let _ = self
                    .ppu_mut(coord.ppu)
                    .memory
                    .set(coord.word.index(), PpuMemoryWord::decode(words));
            }
            Target::MemoryBlock(coord) => {
                let block = PpuMemoryBlock::decode(words);
                self.ppu_mut(coord.ppu)
                    .memory
                    .set_subblock(coord.block.first().index(), &block)
                    .map_err(|err| ChannelError::Transport(err.to_string()))?;
            }
            Target::Timer => {
                let value = u64::from(words[0]);
                self.timer_origin = now.saturating_sub(value);
            }
        }
        Ok(())
    }

    fn read(&mut self, target: Target) -> Result<Vec<u32>, ChannelError> {
        self.advance();
        let words = match target {
            Target::ControlRegister(ppu) => self.ppu(ppu).control.encode(),
            Target::StatusRegister(ppu) => PpuStatusRegister::new(self.ppu(ppu).sleep).encode(),
            Target::MemoryWord(coord) => {
                let word = self.ppu(coord.ppu).memory.get(coord.word.index());
                word.unwrap_or_default().encode()
            }
            Target::MemoryBlock(coord) => self
                .ppu(coord.ppu)
                .memory
                .subblock(coord.block.first().index(), coord.block.size())
                .map_err(|err| ChannelError::Transport(err.to_string()))?
                .encode(),
            Target::Timer => vec![self.now.saturating_sub(self.timer_origin) as u32],
        };
        Ok(words)
    }

    fn wait_until(&mut self, cycles: u32) {
        let deadline = self.timer_origin.saturating_add(u64::from(cycles));
        self.now = self.now.max(deadline);
        self.advance();
    }
}

impl Executor for SimulatedTarget {
    fn submit(&mut self, commands: &[Command]) -> Result<Vec<Vec<u32>>, ChannelError> {
        trace!(commands = commands.len(), now = self.now, "executing batch");
        self.history.push(commands.to_vec());

        let mut responses = Vec::new();
        for command in commands {
            match command {
                Command::Write { target, words } => self.write(*target, words)?,
                Command::Read { target } => responses.push(self.read(*target)?),
                Command::WaitUntil { cycles, .. } => self.wait_until(*cycles),
            }
        }
        Ok(responses)
    }
}
