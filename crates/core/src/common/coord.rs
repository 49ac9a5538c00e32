//! Processor, memory and timer coordinates.
//!
//! Coordinates are small validated values naming a location on the target. They come in
//! two flavours, mirroring the hardware hierarchy:
//! 1. **On-PPU:** `WordOnPpu` and `BlockOnPpu` address PPU-local memory.
//! 2. **On-DLS:** `WordOnDls`, `BlockOnDls` and the register coordinates additionally
//!    select which PPU instance is addressed.
//!
//! Constructors validate against the memory layout in [`constants`](super::constants),
//! so a coordinate that exists is always in range.

use std::fmt;

use super::constants::{
    MAILBOX_FIRST_WORD, MAILBOX_LAST_WORD, PPU_COUNT, PPU_MEMORY_WORDS, RETURN_CODE_WORD,
};
use super::error::CoordinateError;

/// Identifier of one physical PPU instance.
///
/// Defaults to instance 0. The identifier is plain data: it is threaded explicitly through
/// every controller call instead of living in process-wide state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PpuId(u8);

impl PpuId {
    /// The PPU attached to the top synapse array.
    pub const TOP: Self = Self(0);
    /// The PPU attached to the bottom synapse array.
    pub const BOTTOM: Self = Self(1);

    /// Creates a processor identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - Instance number, `0..PPU_COUNT`.
    ///
    /// # Returns
    ///
    /// The identifier, or `CoordinateError::PpuOutOfRange` if no such instance exists.
    pub const fn new(id: u8) -> Result<Self, CoordinateError> {
        if id < PPU_COUNT {
            Ok(Self(id))
        } else {
            Err(CoordinateError::PpuOutOfRange { id })
        }
    }

    /// Returns the raw instance number.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Iterates over every PPU instance in ascending order.
    pub fn iter_all() -> impl Iterator<Item = Self> {
        (0..PPU_COUNT).map(Self)
    }

    /// Coordinate of this PPU's control register.
    #[inline]
    pub const fn control_register(self) -> ControlRegisterOnDls {
        ControlRegisterOnDls(self)
    }

    /// Coordinate of this PPU's status register.
    #[inline]
    pub const fn status_register(self) -> StatusRegisterOnDls {
        StatusRegisterOnDls(self)
    }
}

impl TryFrom<u8> for PpuId {
    type Error = CoordinateError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for PpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PPU{}", self.0)
    }
}

/// Address of one 32-bit word in PPU-local memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordOnPpu(u16);

impl WordOnPpu {
    /// Word holding the program's exit code.
    pub const RETURN_CODE: Self = Self(RETURN_CODE_WORD);

    /// Creates a word address, failing if it lies outside PPU memory.
    pub const fn new(word: u16) -> Result<Self, CoordinateError> {
        if word < PPU_MEMORY_WORDS {
            Ok(Self(word))
        } else {
            Err(CoordinateError::WordOutOfRange {
                word: word as u64,
            })
        }
    }

    /// Creates a word address from a wider index, e.g. one derived from an ELF address.
    pub fn from_index(index: u64) -> Result<Self, CoordinateError> {
        u16::try_from(index)
            .ok()
            .filter(|&word| word < PPU_MEMORY_WORDS)
            .map(Self)
            .ok_or(CoordinateError::WordOutOfRange { word: index })
    }

    /// Returns the raw word index.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns the word index usable for slicing host-side memory models.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WordOnPpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Contiguous, inclusive range of words in PPU-local memory.
///
/// A block always holds at least one word: `first <= last` is enforced on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockOnPpu {
    first: WordOnPpu,
    last: WordOnPpu,
}

impl BlockOnPpu {
    /// Region the program leaves diagnostic text in.
    pub const MAILBOX: Self = Self {
        first: WordOnPpu(MAILBOX_FIRST_WORD),
        last: WordOnPpu(MAILBOX_LAST_WORD),
    };

    /// Creates a block from its inclusive bounds.
    ///
    /// # Arguments
    ///
    /// * `first` - First word of the block.
    /// * `last` - Last word of the block (inclusive).
    ///
    /// # Returns
    ///
    /// The block, or `CoordinateError::InvertedBlock` if `last < first`.
    pub const fn new(first: WordOnPpu, last: WordOnPpu) -> Result<Self, CoordinateError> {
        if first.0 <= last.0 {
            Ok(Self { first, last })
        } else {
            Err(CoordinateError::InvertedBlock {
                first: first.0,
                last: last.0,
            })
        }
    }

    /// Block starting at word 0 spanning `words` words, the region a program image occupies.
    pub fn from_origin(words: usize) -> Result<Self, CoordinateError> {
        let last = words.checked_sub(1).ok_or(CoordinateError::EmptyBlock)?;
        Ok(Self {
            first: WordOnPpu(0),
            last: WordOnPpu::from_index(last as u64)?,
        })
    }

    /// First word of the block.
    #[inline]
    pub const fn first(&self) -> WordOnPpu {
        self.first
    }

    /// Last word of the block (inclusive).
    #[inline]
    pub const fn last(&self) -> WordOnPpu {
        self.last
    }

    /// Number of words covered by the block.
    #[inline]
    pub const fn size(&self) -> usize {
        (self.last.0 - self.first.0) as usize + 1
    }

    /// Returns whether `word` lies inside the block.
    pub const fn contains(&self, word: WordOnPpu) -> bool {
        self.first.0 <= word.0 && word.0 <= self.last.0
    }

    /// Returns whether the two blocks share at least one word.
    pub const fn intersects(&self, other: &Self) -> bool {
        self.first.0 <= other.last.0 && other.first.0 <= self.last.0
    }
}

impl fmt::Display for BlockOnPpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}

/// A memory word on a specific PPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WordOnDls {
    /// Word address in PPU-local memory.
    pub word: WordOnPpu,
    /// Addressed PPU.
    pub ppu: PpuId,
}

impl WordOnDls {
    /// Creates the coordinate.
    pub const fn new(word: WordOnPpu, ppu: PpuId) -> Self {
        Self { word, ppu }
    }
}

/// A memory block on a specific PPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockOnDls {
    /// Block in PPU-local memory.
    pub block: BlockOnPpu,
    /// Addressed PPU.
    pub ppu: PpuId,
}

impl BlockOnDls {
    /// Creates the coordinate.
    pub const fn new(block: BlockOnPpu, ppu: PpuId) -> Self {
        Self { block, ppu }
    }
}

/// Control register of one PPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlRegisterOnDls(pub PpuId);

/// Status register of one PPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatusRegisterOnDls(pub PpuId);

/// The FPGA-side timer used by wait commands. There is exactly one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimerOnDls;
