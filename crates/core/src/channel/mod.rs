//! Command-Batch Channel.
//!
//! This module defines the seam between the controller and whatever transport reaches the
//! target. It provides:
//! 1. **Commands:** Writes, reads and timed waits addressed by a `Target`.
//! 2. **Batches:** `BatchBuilder` assembles an ordered `Batch`; reads hand out `Ticket`s.
//! 3. **Execution:** The `Executor` trait submits a batch and resolves its tickets.
//! 4. **Generators:** The `Generator` trait for reusable command sequences.
//!
//! Execution is synchronous: `Executor::run` returns once every command of the batch has
//! been executed and every read response has arrived.

/// Batch assembly.
pub mod builder;

/// Reusable command sequences.
pub mod generator;

/// Deferred read results.
pub mod ticket;

pub use builder::{Batch, BatchBuilder};
pub use generator::{Generator, generate};
pub use ticket::Ticket;

use std::fmt;

use crate::common::{
    BlockOnDls, ChannelError, ControlRegisterOnDls, PpuId, StatusRegisterOnDls, TimerOnDls,
    WordOnDls,
};
use crate::hal::{
    Container, PpuControlRegister, PpuMemoryBlock, PpuMemoryWord, PpuStatusRegister, Timer,
};

/// Location on the target a command refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// Control register of a PPU.
    ControlRegister(PpuId),
    /// Status register of a PPU.
    StatusRegister(PpuId),
    /// Single word of PPU memory.
    MemoryWord(WordOnDls),
    /// Block of PPU memory.
    MemoryBlock(BlockOnDls),
    /// The FPGA timer.
    Timer,
}

impl Target {
    /// Number of 32-bit words transferred by a write to or read from this target.
    pub const fn size_in_words(&self) -> usize {
        match self {
            Self::MemoryBlock(coord) => coord.block.size(),
            Self::ControlRegister(_) | Self::StatusRegister(_) | Self::MemoryWord(_) | Self::Timer => 1,
        }
    }

    /// PPU addressed by this target, if any.
    pub const fn ppu(&self) -> Option<PpuId> {
        match self {
            Self::ControlRegister(ppu) | Self::StatusRegister(ppu) => Some(*ppu),
            Self::MemoryWord(coord) => Some(coord.ppu),
            Self::MemoryBlock(coord) => Some(coord.ppu),
            Self::Timer => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlRegister(ppu) => write!(f, "{ppu} control register"),
            Self::StatusRegister(ppu) => write!(f, "{ppu} status register"),
            Self::MemoryWord(coord) => write!(f, "{} memory word {}", coord.ppu, coord.word),
            Self::MemoryBlock(coord) => write!(f, "{} memory block {}", coord.ppu, coord.block),
            Self::Timer => write!(f, "timer"),
        }
    }
}

/// One entry of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write encoded container words to a target.
    Write {
        /// Destination.
        target: Target,
        /// Encoded payload; its length matches `target.size_in_words()`.
        words: Vec<u32>,
    },
    /// Read a target; the response resolves the next ticket of the batch.
    Read {
        /// Source.
        target: Target,
    },
    /// Block playback until the timer reaches `cycles`.
    WaitUntil {
        /// Timer to wait on.
        timer: TimerOnDls,
        /// Timer value to wait for.
        cycles: u32,
    },
}

impl Command {
    /// Target of a write or read; `None` for waits.
    pub const fn target(&self) -> Option<&Target> {
        match self {
            Self::Write { target, .. } | Self::Read { target } => Some(target),
            Self::WaitUntil { .. } => None,
        }
    }
}

/// A coordinate names a target and the container type living there.
pub trait Coordinate {
    /// Container written to or read from this coordinate.
    type Container: Container;

    /// Target addressed by this coordinate.
    fn target(&self) -> Target;
}

impl Coordinate for ControlRegisterOnDls {
    type Container = PpuControlRegister;

    fn target(&self) -> Target {
        Target::ControlRegister(self.0)
    }
}

impl Coordinate for StatusRegisterOnDls {
    type Container = PpuStatusRegister;

    fn target(&self) -> Target {
        Target::StatusRegister(self.0)
    }
}

impl Coordinate for WordOnDls {
    type Container = PpuMemoryWord;

    fn target(&self) -> Target {
        Target::MemoryWord(*self)
    }
}

impl Coordinate for BlockOnDls {
    type Container = PpuMemoryBlock;

    fn target(&self) -> Target {
        Target::MemoryBlock(*self)
    }
}

impl Coordinate for TimerOnDls {
    type Container = Timer;

    fn target(&self) -> Target {
        Target::Timer
    }
}

/// Executes batches against a target.
///
/// Implementors provide [`submit`](Executor::submit), which executes commands in order and
/// returns one response per `Read`, in issue order. The provided [`run`](Executor::run)
/// checks the responses against the batch and resolves its tickets.
pub trait Executor {
    /// Executes `commands` in order and blocks until every read response has arrived.
    ///
    /// # Arguments
    ///
    /// * `commands` - The batch contents.
    ///
    /// # Returns
    ///
    /// The raw words of every read response in issue order, or the transport failure.
    fn submit(&mut self, commands: &[Command]) -> Result<Vec<Vec<u32>>, ChannelError>;

    /// Submits `batch` and resolves all tickets issued by it.
    ///
    /// Tickets of the batch are invalidated before submission, so after a failed run no
    /// ticket still reports the result of an earlier run.
    fn run(&mut self, batch: &Batch) -> Result<(), ChannelError> {
        batch.invalidate();
        let responses = self.submit(batch.commands())?;
        batch.resolve(responses)
    }
}
