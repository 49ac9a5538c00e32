//! Program behaviour of the target model.
//!
//! The model does not execute PPU instructions. A `Firmware` decides how long a program
//! runs after its reset is released and what it leaves in memory when it goes to sleep.

use std::fmt;

use crate::common::{BlockOnPpu, WordOnPpu};
use crate::hal::{PpuMemoryBlock, PpuMemoryWord};

/// Behaviour of the program running on one simulated PPU.
pub trait Firmware: fmt::Debug {
    /// Cycles from reset release until the program goes to sleep; `None` runs forever.
    fn run_cycles(&self) -> Option<u64>;

    /// Called once when the program goes to sleep, with the PPU's memory.
    fn finish(&mut self, memory: &mut PpuMemoryBlock);
}

/// A program that never finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverHalts;

impl Firmware for NeverHalts {
    fn run_cycles(&self) -> Option<u64> {
        None
    }

    fn finish(&mut self, _memory: &mut PpuMemoryBlock) {}
}

/// A program that sleeps after a fixed number of cycles and leaves an exit code and,
/// optionally, mailbox text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HaltAfter {
    cycles: u64,
    exit_code: i32,
    mailbox: Option<String>,
}

impl HaltAfter {
    /// Sleeps `cycles` after the reset is released, with exit code 0.
    pub const fn new(cycles: u64) -> Self {
        Self {
            cycles,
            exit_code: 0,
            mailbox: None,
        }
    }

    /// Sets the exit code written to the return-code word.
    #[must_use]
    pub const fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Sets the text written to the mailbox; longer text is truncated.
    #[must_use]
    pub fn with_mailbox(mut self, text: impl Into<String>) -> Self {
        self.mailbox = Some(text.into());
        self
    }
}

impl Firmware for HaltAfter {
    fn run_cycles(&self) -> Option<u64> {
        Some(self.cycles)
    }

    fn finish(&mut self, memory: &mut PpuMemoryBlock) {
        let _ = memory.set(
            WordOnPpu::RETURN_CODE.index(),
            PpuMemoryWord::new(self.exit_code as u32),
        );
        if let Some(text) = &self.mailbox {
            let mailbox = BlockOnPpu::MAILBOX;
            let block = PpuMemoryBlock::from_text(text, mailbox.size());
            let _ = memory.set_subblock(mailbox.first().index(), &block);
        }
    }
}
