//! PPU Memory Containers.
//!
//! This module provides the host-side view of PPU memory contents:
//! 1. **Words:** `PpuMemoryWord`, a single 32-bit word (exit code, scalars).
//! 2. **Blocks:** `PpuMemoryBlock`, a run of words (program image, symbol storage, mailbox).
//! 3. **Text:** Decoding of blocks as printable text, as used by the mailbox.
//!
//! The PPU is big-endian: the first character of a string stored in memory is the most
//! significant byte of its word.

use std::fmt;

use thiserror::Error;

use super::Container;
use crate::common::constants::PPU_WORD_BYTES;

/// Number of words per line in the hex dump produced by `Display`.
const WORDS_PER_LINE: usize = 4;

/// One 32-bit word of PPU memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PpuMemoryWord(u32);

impl PpuMemoryWord {
    /// Creates a word from its raw value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PpuMemoryWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Container for PpuMemoryWord {
    fn encode(&self) -> Vec<u32> {
        vec![self.0]
    }

    fn decode(words: &[u32]) -> Self {
        Self(words.first().copied().unwrap_or(0))
    }
}

/// A subblock request does not fit into its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subblock from index {begin} of size {len} larger than block size of {size}")]
pub struct SubblockOutOfRange {
    /// Requested start index.
    pub begin: usize,
    /// Requested length.
    pub len: usize,
    /// Size of the block.
    pub size: usize,
}

/// A contiguous run of PPU memory words.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PpuMemoryBlock {
    words: Vec<PpuMemoryWord>,
}

impl PpuMemoryBlock {
    /// Creates a zero-filled block of `len` words.
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: vec![PpuMemoryWord::default(); len],
        }
    }

    /// Creates a block from raw word values.
    pub fn from_words<I>(words: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            words: words.into_iter().map(PpuMemoryWord).collect(),
        }
    }

    /// Packs bytes into big-endian words, zero-padding the last word.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self {
            words: bytes
                .chunks(PPU_WORD_BYTES)
                .map(|chunk| {
                    let mut word = [0u8; PPU_WORD_BYTES];
                    word[..chunk.len()].copy_from_slice(chunk);
                    PpuMemoryWord(u32::from_be_bytes(word))
                })
                .collect(),
        }
    }

    /// Stores `text` into a block of `len` words, NUL-padded and truncated to fit.
    pub fn from_text(text: &str, len: usize) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(len * PPU_WORD_BYTES, 0);
        Self::from_be_bytes(&bytes)
    }

    /// Returns the words of the block.
    pub fn words(&self) -> &[PpuMemoryWord] {
        &self.words
    }

    /// Returns the raw word values.
    pub fn raw_words(&self) -> Vec<u32> {
        self.words.iter().map(|w| w.0).collect()
    }

    /// Number of words in the block.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns whether the block holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the word at `index`, or `None` past the end of the block.
    pub fn get(&self, index: usize) -> Option<PpuMemoryWord> {
        self.words.get(index).copied()
    }

    /// Overwrites the word at `index`; returns `false` if `index` is out of range.
    pub fn set(&mut self, index: usize, word: PpuMemoryWord) -> bool {
        self.words.get_mut(index).map(|slot| *slot = word).is_some()
    }

    /// Copies `len` words starting at `begin` into a new block.
    pub fn subblock(&self, begin: usize, len: usize) -> Result<Self, SubblockOutOfRange> {
        let end = begin.checked_add(len).filter(|&end| end <= self.len());
        match end {
            Some(end) => Ok(Self {
                words: self.words[begin..end].to_vec(),
            }),
            None => Err(SubblockOutOfRange {
                begin,
                len,
                size: self.len(),
            }),
        }
    }

    /// Overwrites the words starting at `begin` with the words of `subblock`.
    pub fn set_subblock(&mut self, begin: usize, subblock: &Self) -> Result<(), SubblockOutOfRange> {
        let size = self.len();
        let out_of_range = SubblockOutOfRange {
            begin,
            len: subblock.len(),
            size,
        };
        let end = begin
            .checked_add(subblock.len())
            .filter(|&end| end <= size)
            .ok_or(out_of_range)?;
        self.words[begin..end].copy_from_slice(&subblock.words);
        Ok(())
    }

    /// Decodes the block as text.
    ///
    /// Every word contributes its four bytes in big-endian order. Printable ASCII and ASCII
    /// whitespace are kept; everything else, including NUL padding, is dropped.
    pub fn to_text(&self) -> String {
        self.words
            .iter()
            .flat_map(|w| w.0.to_be_bytes())
            .filter(|&b| is_text_byte(b))
            .map(char::from)
            .collect()
    }
}

/// Mirrors C `isprint(b) || isspace(b)` for the ASCII range.
const fn is_text_byte(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' ' || b.is_ascii_whitespace() || b == 0x0b
}

/// Replaces non-printable bytes with `.` for the ASCII column of a dump.
const fn dump_char(b: u8) -> char {
    if b.is_ascii_graphic() || b == b' ' {
        b as char
    } else {
        '.'
    }
}

impl fmt::Display for PpuMemoryBlock {
    /// Hex dump: per line, four words as high/low halfwords followed by their ASCII.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.words.chunks(WORDS_PER_LINE) {
            for word in line {
                write!(f, "{:04x} {:04x} ", word.0 >> 16, word.0 & 0xFFFF)?;
            }
            for word in line {
                for b in word.0.to_be_bytes() {
                    write!(f, "{}", dump_char(b))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Container for PpuMemoryBlock {
    fn encode(&self) -> Vec<u32> {
        self.raw_words()
    }

    fn decode(words: &[u32]) -> Self {
        Self::from_words(words.iter().copied())
    }
}

impl From<Vec<PpuMemoryWord>> for PpuMemoryBlock {
    fn from(words: Vec<PpuMemoryWord>) -> Self {
        Self { words }
    }
}
