//! PPU Memory Layout Constants.
//!
//! The PPU addresses its local memory in 32-bit big-endian words. The top of memory is
//! reserved for communication with the host: a return-code word followed by the mailbox.

/// Number of PPU instances on one chip.
pub const PPU_COUNT: u8 = 2;

/// Size of the PPU-local memory in 32-bit words (16 KiB).
pub const PPU_MEMORY_WORDS: u16 = 4096;

/// Size of one PPU memory word in bytes.
pub const PPU_WORD_BYTES: usize = 4;

/// First word of the mailbox region.
pub const MAILBOX_FIRST_WORD: u16 = 0x0F00;

/// Last word (inclusive) of the mailbox region.
pub const MAILBOX_LAST_WORD: u16 = 0x0FFF;

/// Word the program stores its exit code into before going to sleep.
pub const RETURN_CODE_WORD: u16 = 0x0EFF;

/// Timer value the completion poller waits for in each iteration.
pub const DEFAULT_POLL_WAIT_CYCLES: u32 = 1000;

/// Timer value the result collector waits for so that read responses have arrived.
pub const DEFAULT_SETTLE_WAIT_CYCLES: u32 = 1000;

/// Default cycle budget of the command-line entry point.
pub const DEFAULT_TIMEOUT_CYCLES: u64 = 10_000_000;
