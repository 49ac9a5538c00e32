//! ELF Program Reader.
//!
//! This module turns a linked PPU executable into a program image and a symbol table. It
//! performs:
//! 1. **Validation:** Only 32-bit big-endian PowerPC ELF files are accepted.
//! 2. **Program extraction:** Every section flagged `SHF_ALLOC` that is not `SHT_NOBITS`
//!    (`.text`, `.data`, `.rodata`, `.init_array`, `.tdata`, ...) is copied to its address;
//!    gaps are zero. `.bss`-like sections carry no contents and are left to the loader's
//!    symbol zero-fill.
//! 3. **Symbol extraction:** Object and function symbols become word ranges
//!    `[addr / 4, (addr + size - 1) / 4]`.

use std::fs;
use std::path::Path;

use object::elf::{SHF_ALLOC, SHT_NOBITS};
use object::read::elf::{ElfFile32, ElfSection32, SectionHeader as _};
use object::{Architecture, Endianness, Object, ObjectSection, ObjectSymbol, SymbolKind};
use tracing::debug;

use super::{ProgramImage, Symbol, SymbolTable, SymbolType};
use crate::common::constants::{PPU_MEMORY_WORDS, PPU_WORD_BYTES};
use crate::common::{BlockOnPpu, CoordinateError, ImageError, WordOnPpu};
use crate::hal::PpuMemoryBlock;

/// Size of PPU memory in bytes.
const PPU_MEMORY_BYTES: u64 = PPU_MEMORY_WORDS as u64 * PPU_WORD_BYTES as u64;

/// A PPU executable held in memory.
#[derive(Clone, Debug)]
pub struct ElfImage {
    data: Vec<u8>,
}

impl ElfImage {
    /// Reads and validates an executable from disk.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the unstripped program binary.
    ///
    /// # Returns
    ///
    /// The image, or an `ImageError` if the file cannot be read or is not a PPU executable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), "read program file");
        Self::from_bytes(data)
    }

    /// Validates an executable already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        let image = Self { data };
        let _ = image.parse()?;
        Ok(image)
    }

    fn parse(&self) -> Result<ElfFile32<'_, Endianness>, ImageError> {
        let file = ElfFile32::<Endianness>::parse(self.data.as_slice())?;
        if file.is_little_endian() {
            return Err(ImageError::UnsupportedFormat(
                "little-endian ELF, the PPU is big-endian".to_owned(),
            ));
        }
        let arch = file.architecture();
        if arch != Architecture::PowerPc {
            return Err(ImageError::UnsupportedFormat(format!(
                "architecture {arch:?}, expected PowerPc"
            )));
        }
        Ok(file)
    }

    /// Extracts the program image.
    ///
    /// # Returns
    ///
    /// The words from word 0 to the end of the last section with contents.
    pub fn read_program(&self) -> Result<ProgramImage, ImageError> {
        let file = self.parse()?;
        let endian = file.endian();
        let mut bytes: Vec<u8> = Vec::new();

        for section in file.sections() {
            if !is_program_section(&section, endian) {
                continue;
            }
            let data = section.data()?;
            if data.is_empty() {
                continue;
            }
            let address = section.address();
            let size = data.len() as u64;
            let end = address
                .checked_add(size)
                .filter(|&end| end <= PPU_MEMORY_BYTES)
                .ok_or_else(|| ImageError::SectionOutOfRange {
                    name: section.name().unwrap_or("<unnamed>").to_owned(),
                    address,
                    size,
                })?;

            let (start, end) = (address as usize, end as usize);
            if bytes.len() < end {
                bytes.resize(end, 0);
            }
            bytes[start..end].copy_from_slice(data);
        }

        let block = PpuMemoryBlock::from_be_bytes(&bytes);
        debug!(words = block.len(), "extracted program image");
        Ok(ProgramImage::new(block))
    }

    /// Extracts the symbol table.
    ///
    /// Object symbols become [`SymbolType::Object`], function symbols
    /// [`SymbolType::Function`], TLS and unknown kinds [`SymbolType::Other`]. Undefined,
    /// zero-sized, section, file and label symbols are skipped.
    pub fn read_symbols(&self) -> Result<SymbolTable, ImageError> {
        let file = self.parse()?;
        let mut table = SymbolTable::new();

        for symbol in file.symbols() {
            let kind = match symbol.kind() {
                SymbolKind::Data => SymbolType::Object,
                SymbolKind::Text => SymbolType::Function,
                SymbolKind::Tls | SymbolKind::Unknown => SymbolType::Other,
                _ => continue,
            };
            if symbol.is_undefined() || symbol.size() == 0 {
                continue;
            }
            let name = symbol.name()?;
            if name.is_empty() {
                continue;
            }
            let range = word_range(symbol.address(), symbol.size()).map_err(|source| {
                ImageError::SymbolOutOfRange {
                    name: name.to_owned(),
                    source,
                }
            })?;
            let _ = table.insert(name.to_owned(), Symbol::new(kind, range));
        }

        debug!(symbols = table.len(), "extracted symbol table");
        Ok(table)
    }
}

/// Allocated sections with contents in the file.
fn is_program_section(section: &ElfSection32<'_, '_, Endianness>, endian: Endianness) -> bool {
    let header = section.elf_section_header();
    header.sh_flags(endian) & SHF_ALLOC != 0 && header.sh_type(endian) != SHT_NOBITS
}

/// Words covered by `size` bytes starting at byte `address`.
fn word_range(address: u64, size: u64) -> Result<BlockOnPpu, CoordinateError> {
    let word_bytes = PPU_WORD_BYTES as u64;
    let last_byte = address
        .checked_add(size - 1)
        .ok_or(CoordinateError::WordOutOfRange { word: u64::MAX })?;
    let first = WordOnPpu::from_index(address / word_bytes)?;
    let last = WordOnPpu::from_index(last_byte / word_bytes)?;
    BlockOnPpu::new(first, last)
}
