//! Program images and symbol tables.
//!
//! A compiled PPU program is described by two things:
//! 1. **Program image:** The words written to PPU memory starting at word 0.
//! 2. **Symbol table:** Named, typed memory ranges declared by the program. The loader
//!    zero-fills every range before writing the program, because symbol storage outside
//!    the image (e.g. `.bss`) is not reset between runs.

/// ELF reader.
pub mod elf;

pub use elf::ElfImage;

use std::collections::BTreeMap;
use std::fmt;

use crate::common::BlockOnPpu;
use crate::hal::PpuMemoryBlock;

/// Contents of PPU program memory, placed at word 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    block: PpuMemoryBlock,
}

impl ProgramImage {
    /// Wraps the words of a program.
    pub const fn new(block: PpuMemoryBlock) -> Self {
        Self { block }
    }

    /// Program words.
    pub const fn block(&self) -> &PpuMemoryBlock {
        &self.block
    }

    /// Length of the program in words.
    pub fn size(&self) -> usize {
        self.block.len()
    }

    /// Returns whether the program holds no words.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }
}

impl From<PpuMemoryBlock> for ProgramImage {
    fn from(block: PpuMemoryBlock) -> Self {
        Self::new(block)
    }
}

/// Kind of a symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SymbolType {
    /// Data storage (variables).
    Object,
    /// Code.
    Function,
    /// Anything else.
    #[default]
    Other,
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "object",
            Self::Function => "function",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A named memory range declared by the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Kind of the symbol.
    pub kind: SymbolType,
    /// Words occupied by the symbol.
    pub range: BlockOnPpu,
}

impl Symbol {
    /// Creates a symbol.
    pub const fn new(kind: SymbolType, range: BlockOnPpu) -> Self {
        Self { kind, range }
    }
}

/// Symbols by name, iterated in name order.
pub type SymbolTable = BTreeMap<String, Symbol>;
