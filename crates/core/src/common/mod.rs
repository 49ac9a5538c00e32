//! Common types shared by every stage of the controller.
//!
//! This module provides:
//! 1. **Coordinates:** Validated identifiers for processors, memory words, memory blocks and the timer.
//! 2. **Constants:** The PPU memory layout (size, mailbox, return-code word).
//! 3. **Error Handling:** One error type per stage plus the crate-level `Error`.

/// Processor, memory and timer coordinates.
pub mod coord;

/// PPU memory layout constants.
pub mod constants;

/// Error types for every stage.
pub mod error;

pub use coord::{
    BlockOnDls, BlockOnPpu, ControlRegisterOnDls, PpuId, StatusRegisterOnDls, TimerOnDls,
    WordOnDls, WordOnPpu,
};
pub use error::{
    ChannelError, CollectError, ConfigError, CoordinateError, Error, ImageError, LoadError,
    TicketError, TimeoutError, WaitError,
};
