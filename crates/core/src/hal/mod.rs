//! Hardware containers.
//!
//! A container is the host-side value of something that can be written to or read from the
//! target: a register, a memory word, a memory block or the timer. Each one converts itself
//! to and from the raw 32-bit words carried by the channel.

/// Memory words and blocks, including mailbox text decoding.
pub mod memory;

/// Control and status registers.
pub mod registers;

/// FPGA-side timer.
pub mod timer;

pub use memory::{PpuMemoryBlock, PpuMemoryWord, SubblockOutOfRange};
pub use registers::{PpuControlRegister, PpuStatusRegister};
pub use timer::Timer;

/// A value that can be transferred to or from a coordinate on the target.
///
/// The coordinate side of the pairing is [`Coordinate`](crate::channel::Coordinate).
pub trait Container: Sized {
    /// Encodes the container into the raw words sent to the target.
    fn encode(&self) -> Vec<u32>;

    /// Decodes the container from the raw words of a read response.
    ///
    /// The channel checks response sizes before tickets are resolved, so `words` always
    /// holds exactly as many words as the coordinate covers.
    fn decode(words: &[u32]) -> Self;
}
