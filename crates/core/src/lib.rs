//! PPU program execution controller.
//!
//! This crate drives programs on the PPU co-processor through a batched command channel:
//! 1. **Channel:** Ordered command batches, deferred read tickets, and the `Executor` seam.
//! 2. **Containers:** Control/status registers, memory words and blocks, and the FPGA timer.
//! 3. **Image:** ELF reader producing the program image and its symbol table.
//! 4. **Controller:** Load, run/halt, completion polling, and result collection.
//! 5. **Target model:** An in-process `Executor` that behaves like a PPU for tests and dry runs.

/// Coordinates, memory layout constants and error types.
pub mod common;
/// Controller configuration (timing, run defaults).
pub mod config;
/// Command batches, tickets, executors and sequence generators.
pub mod channel;
/// Hardware containers written to or read from the target.
pub mod hal;
/// Program image and symbol table reading.
pub mod image;
/// The execution controller: load, run/halt, poll, collect.
pub mod ppu;
/// In-process target model implementing `Executor`.
pub mod sim;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Stateless controller for load/await/stop on one processor at a time.
pub use crate::ppu::Controller;
/// Validated processor instance identifier.
pub use crate::common::PpuId;
