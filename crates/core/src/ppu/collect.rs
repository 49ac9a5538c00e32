//! Result Collector.
//!
//! Stopping is one batch: halt write, read of the return-code word, optional read of the
//! mailbox, then a timer reset and a settle wait. The reads are issued before their values
//! are guaranteed to be produced; the trailing wait makes sure they are.

use std::fmt;

use tracing::{debug, info};

use super::control::push_reset;
use crate::channel::{BatchBuilder, Executor, Generator, Ticket};
use crate::common::{
    BlockOnDls, BlockOnPpu, CollectError, PpuId, TimerOnDls, WordOnDls, WordOnPpu,
};
use crate::hal::{PpuMemoryBlock, PpuMemoryWord, Timer};

/// Exit code left by a program, signed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success.
    pub const SUCCESS: Self = Self(0);

    /// Reinterprets a raw memory word as two's-complement.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw as i32)
    }

    /// Signed value.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns whether the program reported success.
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<PpuMemoryWord> for ExitCode {
    fn from(word: PpuMemoryWord) -> Self {
        Self::from_raw(word.value())
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a stopped program left behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramResult {
    /// Decoded return-code word.
    pub exit_code: ExitCode,
    /// Printable mailbox text, if the mailbox was read.
    pub mailbox: Option<String>,
}

/// Tickets of a stop batch.
#[derive(Debug)]
pub struct StopTickets {
    /// Return-code word.
    pub exit_code: Ticket<PpuMemoryWord>,
    /// Mailbox contents, when requested.
    pub mailbox: Option<Ticket<PpuMemoryBlock>>,
}

/// Halt and read-back sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopSequence {
    ppu: PpuId,
    read_mailbox: bool,
    settle_cycles: u32,
}

impl StopSequence {
    /// Creates the sequence for `ppu`.
    pub const fn new(ppu: PpuId, read_mailbox: bool, settle_cycles: u32) -> Self {
        Self {
            ppu,
            read_mailbox,
            settle_cycles,
        }
    }
}

impl Generator for StopSequence {
    type Output = StopTickets;

    fn generate(&self) -> (BatchBuilder, Self::Output) {
        let mut builder = BatchBuilder::new();
        push_reset(&mut builder, self.ppu);
        let exit_code = builder.read(&WordOnDls::new(WordOnPpu::RETURN_CODE, self.ppu));
        let mailbox = self
            .read_mailbox
            .then(|| builder.read(&BlockOnDls::new(BlockOnPpu::MAILBOX, self.ppu)));
        builder.write(&TimerOnDls, &Timer::new(0));
        builder.wait_until(TimerOnDls, self.settle_cycles);
        (builder, StopTickets { exit_code, mailbox })
    }
}

/// Halts `ppu` and reads back its exit code and, optionally, its mailbox.
///
/// A nonzero exit code is reported, not treated as an error.
pub fn collect_result<E: Executor + ?Sized>(
    executor: &mut E,
    ppu: PpuId,
    read_mailbox: bool,
    settle_cycles: u32,
) -> Result<ProgramResult, CollectError> {
    let (builder, tickets) = StopSequence::new(ppu, read_mailbox, settle_cycles).generate();
    debug!(%ppu, read_mailbox, "submitting stop batch");
    executor.run(&builder.done())?;

    let exit_code = ExitCode::from(tickets.exit_code.get()?);
    let mailbox = match tickets.mailbox {
        Some(ticket) => Some(ticket.get()?.to_text()),
        None => None,
    };
    info!(%ppu, %exit_code, "program stopped");
    Ok(ProgramResult { exit_code, mailbox })
}
