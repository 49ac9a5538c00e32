//! Error types.
//!
//! Every stage reports its own error type so callers can tell a malformed image from a
//! timeout from a lost connection:
//! 1. **Coordinates:** `CoordinateError` for out-of-range identifiers.
//! 2. **Channel:** `ChannelError` for transport failures, `TicketError` for early ticket reads.
//! 3. **Stages:** `LoadError`, `TimeoutError`/`WaitError` and `CollectError`.
//! 4. **Ambient:** `ImageError` for the ELF reader, `ConfigError` for configuration.
//!
//! Channel failures are wrapped unmodified; nothing in this crate retries them.

use std::path::PathBuf;

use thiserror::Error;

use super::constants::{PPU_COUNT, PPU_MEMORY_WORDS};
use super::coord::{BlockOnPpu, PpuId};
use crate::channel::Target;

/// An identifier or range does not exist on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// No PPU instance with this number.
    #[error("PPU id {id} out of range (0..{count})", count = PPU_COUNT)]
    PpuOutOfRange {
        /// Requested instance number.
        id: u8,
    },
    /// Word address beyond the end of PPU memory.
    #[error("word {word:#x} outside PPU memory of {size} words", size = PPU_MEMORY_WORDS)]
    WordOutOfRange {
        /// Requested word index.
        word: u64,
    },
    /// Block whose last word precedes its first word.
    #[error("inverted block: first word {first:#x} after last word {last:#x}")]
    InvertedBlock {
        /// First word.
        first: u16,
        /// Last word.
        last: u16,
    },
    /// Block of zero words.
    #[error("a memory block must span at least one word")]
    EmptyBlock,
}

/// Failure reported by the command-batch channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The connection to the target is gone.
    #[error("connection to the target was lost")]
    Disconnected,
    /// Transport-specific failure description.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The executor returned a different number of read responses than the batch issued.
    #[error("batch issued {expected} reads but {actual} responses arrived")]
    ResponseCount {
        /// Reads issued by the batch.
        expected: usize,
        /// Responses returned by the executor.
        actual: usize,
    },
    /// A read response does not match the size of its target.
    #[error("read of {target} expected {expected} words, got {actual}")]
    ResponseSize {
        /// Target of the read.
        target: Target,
        /// Words held by the target.
        expected: usize,
        /// Words in the response.
        actual: usize,
    },
    /// A write payload does not match the size of its target.
    #[error("write to {target} carries {actual} words, target holds {expected}")]
    PayloadSize {
        /// Target of the write.
        target: Target,
        /// Words held by the target.
        expected: usize,
        /// Words in the payload.
        actual: usize,
    },
}

/// A ticket was read before the batch owning it was executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    /// The read result does not exist yet.
    #[error("result of read from {target} not available: batch has not been executed")]
    NotYetAvailable {
        /// Target of the pending read.
        target: Target,
    },
}

/// The program file could not be turned into an image and symbol table.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Reading the file failed.
    #[error("could not read program '{path}'")]
    Io {
        /// Program path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a well-formed ELF object.
    #[error("malformed ELF file: {0}")]
    Parse(#[from] object::read::Error),
    /// The file is ELF but not a PPU executable.
    #[error("unsupported program format: {0}")]
    UnsupportedFormat(String),
    /// A loadable section lies outside PPU memory.
    #[error("section '{name}' at {address:#x} (+{size} bytes) lies outside PPU memory")]
    SectionOutOfRange {
        /// Section name.
        name: String,
        /// Section start address in bytes.
        address: u64,
        /// Section size in bytes.
        size: u64,
    },
    /// A symbol lies outside PPU memory.
    #[error("symbol '{name}' lies outside PPU memory")]
    SymbolOutOfRange {
        /// Symbol name.
        name: String,
        /// Range violation.
        #[source]
        source: CoordinateError,
    },
}

/// The program image or symbol table is unusable; nothing was submitted.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The program holds no words.
    #[error("program image is empty")]
    EmptyProgram,
    /// The program does not fit into PPU memory.
    #[error("program of {words} words exceeds PPU memory of {capacity} words")]
    ProgramTooLarge {
        /// Program size in words.
        words: usize,
        /// PPU memory size in words.
        capacity: u16,
    },
    /// A symbol starts inside the program region but extends past its end.
    #[error("symbol '{name}' at {range} straddles the end of the program region {program}")]
    SymbolStraddlesProgram {
        /// Symbol name.
        name: String,
        /// Symbol range.
        range: BlockOnPpu,
        /// Program region.
        program: BlockOnPpu,
    },
    /// Two data symbols partially share storage.
    #[error("data symbols '{first}' and '{second}' overlap")]
    SymbolOverlap {
        /// First symbol, by name order.
        first: String,
        /// Second symbol, by name order.
        second: String,
    },
    /// The program file could not be read.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// Submitting the load batch failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// The PPU did not reach the sleep state within the cycle budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{ppu} did not finish within {waited_cycles} cycles ({iterations} polls)")]
pub struct TimeoutError {
    /// PPU that was polled.
    pub ppu: PpuId,
    /// Status polls performed.
    pub iterations: u64,
    /// Cycles spent waiting on the target side.
    pub waited_cycles: u64,
}

/// Failure while waiting for program completion.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The cycle budget ran out.
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
    /// Submitting a poll batch failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
    /// A status read was not resolved.
    #[error(transparent)]
    Ticket(#[from] TicketError),
    /// The per-iteration wait was zero cycles.
    #[error("poll wait must be at least one cycle")]
    ZeroWait,
}

/// Failure while halting the PPU and reading back its results.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Submitting the stop batch failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
    /// A result read was not resolved.
    #[error(transparent)]
    Ticket(#[from] TicketError),
}

/// Invalid controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("could not read configuration '{path}'")]
    Io {
        /// Configuration path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON for `Config`.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A poll iteration must wait for a positive number of cycles.
    #[error("timing.poll_wait_cycles must be positive")]
    ZeroPollWait,
    /// The result collector must wait for a positive number of cycles.
    #[error("timing.settle_wait_cycles must be positive")]
    ZeroSettleWait,
    /// The configured PPU does not exist.
    #[error("run.ppu: {0}")]
    Ppu(#[from] CoordinateError),
}

/// Any failure of a complete load/await/stop sequence.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Waiting for completion failed.
    #[error(transparent)]
    Wait(#[from] WaitError),
    /// Collecting results failed.
    #[error(transparent)]
    Collect(#[from] CollectError),
    /// A run/halt write failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
    /// Reading the program file failed.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An identifier was out of range.
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}
