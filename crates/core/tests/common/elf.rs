//! Minimal ELF32 executable writer.
//!
//! Produces files with the section layout a linked PPU program has: `.text` at address 0,
//! `.data`, `.bss`, a symbol table and the string tables. Big-endian PowerPC unless told
//! otherwise.

use std::fs;
use std::path::{Path, PathBuf};

const EM_PPC: u16 = 20;
const EM_RISCV: u16 = 243;

pub const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_NOBITS: u32 = 8;
pub const SHT_INIT_ARRAY: u32 = 14;

pub const SHF_WRITE: u32 = 0x1;
pub const SHF_ALLOC: u32 = 0x2;
const SHF_EXECINSTR: u32 = 0x4;
pub const SHF_TLS: u32 = 0x400;

pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;

const STB_GLOBAL: u8 = 1;

pub const TEXT_SECTION: u16 = 1;
pub const DATA_SECTION: u16 = 2;
pub const BSS_SECTION: u16 = 3;

const HEADER_SIZE: usize = 52;
const SECTION_HEADER_SIZE: usize = 40;
const SYMBOL_SIZE: usize = 16;

struct ElfSymbol {
    name: String,
    value: u32,
    size: u32,
    kind: u8,
    section: u16,
}

struct SectionHeader {
    name: u32,
    kind: u32,
    flags: u32,
    addr: u32,
    offset: u32,
    size: u32,
    link: u32,
    info: u32,
    align: u32,
    entsize: u32,
}

/// Builder for a PPU executable.
pub struct ElfBuilder {
    text: Vec<u32>,
    data_addr: u32,
    data: Vec<u32>,
    data_kind: u32,
    data_flags: u32,
    bss_addr: u32,
    bss_size: u32,
    symbols: Vec<ElfSymbol>,
    machine: u16,
    little_endian: bool,
}

impl ElfBuilder {
    /// Executable whose `.text` holds `text` at address 0.
    pub fn new(text: &[u32]) -> Self {
        Self {
            text: text.to_vec(),
            data_addr: 0,
            data: Vec::new(),
            data_kind: SHT_PROGBITS,
            data_flags: SHF_WRITE | SHF_ALLOC,
            bss_addr: 0,
            bss_size: 0,
            symbols: Vec::new(),
            machine: EM_PPC,
            little_endian: false,
        }
    }

    /// Places `.data` at byte address `addr`.
    pub fn data(mut self, addr: u32, words: &[u32]) -> Self {
        self.data_addr = addr;
        self.data = words.to_vec();
        self
    }

    /// Overrides the type and flags of the section holding `.data`.
    pub fn data_section(mut self, kind: u32, flags: u32) -> Self {
        self.data_kind = kind;
        self.data_flags = flags;
        self
    }

    /// Places a `.bss` of `size` bytes at byte address `addr`.
    pub fn bss(mut self, addr: u32, size: u32) -> Self {
        self.bss_addr = addr;
        self.bss_size = size;
        self
    }

    /// Adds a global symbol.
    pub fn symbol(mut self, name: &str, kind: u8, section: u16, value: u32, size: u32) -> Self {
        self.symbols.push(ElfSymbol {
            name: name.to_owned(),
            value,
            size,
            kind,
            section,
        });
        self
    }

    /// Adds a data object in `.data`.
    pub fn object(self, name: &str, value: u32, size: u32) -> Self {
        self.symbol(name, STT_OBJECT, DATA_SECTION, value, size)
    }

    /// Adds a function in `.text`.
    pub fn function(self, name: &str, value: u32, size: u32) -> Self {
        self.symbol(name, STT_FUNC, TEXT_SECTION, value, size)
    }

    /// Marks the file as RISC-V.
    pub fn riscv(mut self) -> Self {
        self.machine = EM_RISCV;
        self
    }

    /// Writes all fields little-endian.
    pub fn little_endian(mut self) -> Self {
        self.little_endian = true;
        self
    }

    fn put_u16(&self, out: &mut Vec<u8>, value: u16) {
        if self.little_endian {
            out.extend_from_slice(&value.to_le_bytes());
        } else {
            out.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
        if self.little_endian {
            out.extend_from_slice(&value.to_le_bytes());
        } else {
            out.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn words(&self, words: &[u32]) -> Vec<u8> {
        let mut out = Vec::new();
        for &word in words {
            self.put_u32(&mut out, word);
        }
        out
    }

    /// Serializes the executable.
    pub fn build(&self) -> Vec<u8> {
        let mut shstrtab = vec![0u8];
        let text_name = add_name(&mut shstrtab, ".text");
        let data_name = add_name(&mut shstrtab, ".data");
        let bss_name = add_name(&mut shstrtab, ".bss");
        let symtab_name = add_name(&mut shstrtab, ".symtab");
        let strtab_name = add_name(&mut shstrtab, ".strtab");
        let shstrtab_name = add_name(&mut shstrtab, ".shstrtab");

        let mut strtab = vec![0u8];
        let mut symtab = vec![0u8; SYMBOL_SIZE];
        for symbol in &self.symbols {
            let name = add_name(&mut strtab, &symbol.name);
            self.put_u32(&mut symtab, name);
            self.put_u32(&mut symtab, symbol.value);
            self.put_u32(&mut symtab, symbol.size);
            symtab.push((STB_GLOBAL << 4) | symbol.kind);
            symtab.push(0);
            self.put_u16(&mut symtab, symbol.section);
        }

        let text = self.words(&self.text);
        let data = self.words(&self.data);

        let mut body = Vec::new();
        let mut place = |bytes: &[u8]| -> u32 {
            while (HEADER_SIZE + body.len()) % 4 != 0 {
                body.push(0);
            }
            let offset = (HEADER_SIZE + body.len()) as u32;
            body.extend_from_slice(bytes);
            offset
        };
        let text_offset = place(&text);
        let data_offset = place(&data);
        let symtab_offset = place(&symtab);
        let strtab_offset = place(&strtab);
        let shstrtab_offset = place(&shstrtab);
        let shoff = place(&[]);

        let sections = [
            SectionHeader::null(),
            SectionHeader {
                name: text_name,
                kind: SHT_PROGBITS,
                flags: SHF_ALLOC | SHF_EXECINSTR,
                addr: 0,
                offset: text_offset,
                size: text.len() as u32,
                link: 0,
                info: 0,
                align: 4,
                entsize: 0,
            },
            SectionHeader {
                name: data_name,
                kind: self.data_kind,
                flags: self.data_flags,
                addr: self.data_addr,
                offset: data_offset,
                size: data.len() as u32,
                link: 0,
                info: 0,
                align: 4,
                entsize: 0,
            },
            SectionHeader {
                name: bss_name,
                kind: SHT_NOBITS,
                flags: SHF_WRITE | SHF_ALLOC,
                addr: self.bss_addr,
                offset: symtab_offset,
                size: self.bss_size,
                link: 0,
                info: 0,
                align: 4,
                entsize: 0,
            },
            SectionHeader {
                name: symtab_name,
                kind: SHT_SYMTAB,
                flags: 0,
                addr: 0,
                offset: symtab_offset,
                size: symtab.len() as u32,
                link: 5,
                info: 1,
                align: 4,
                entsize: SYMBOL_SIZE as u32,
            },
            SectionHeader {
                name: strtab_name,
                kind: SHT_STRTAB,
                flags: 0,
                addr: 0,
                offset: strtab_offset,
                size: strtab.len() as u32,
                link: 0,
                info: 0,
                align: 1,
                entsize: 0,
            },
            SectionHeader {
                name: shstrtab_name,
                kind: SHT_STRTAB,
                flags: 0,
                addr: 0,
                offset: shstrtab_offset,
                size: shstrtab.len() as u32,
                link: 0,
                info: 0,
                align: 1,
                entsize: 0,
            },
        ];

        let mut out = Vec::new();
        out.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
        out.push(1); // ELFCLASS32
        out.push(if self.little_endian { 1 } else { 2 });
        out.push(1); // EV_CURRENT
        out.resize(16, 0);
        self.put_u16(&mut out, 2); // ET_EXEC
        self.put_u16(&mut out, self.machine);
        self.put_u32(&mut out, 1);
        self.put_u32(&mut out, 0); // e_entry
        self.put_u32(&mut out, 0); // e_phoff
        self.put_u32(&mut out, shoff);
        self.put_u32(&mut out, 0); // e_flags
        self.put_u16(&mut out, HEADER_SIZE as u16);
        self.put_u16(&mut out, 32);
        self.put_u16(&mut out, 0);
        self.put_u16(&mut out, SECTION_HEADER_SIZE as u16);
        self.put_u16(&mut out, sections.len() as u16);
        self.put_u16(&mut out, (sections.len() - 1) as u16);
        assert_eq!(out.len(), HEADER_SIZE);

        out.extend_from_slice(&body);
        for section in &sections {
            for field in [
                section.name,
                section.kind,
                section.flags,
                section.addr,
                section.offset,
                section.size,
                section.link,
                section.info,
                section.align,
                section.entsize,
            ] {
                self.put_u32(&mut out, field);
            }
        }
        out
    }

    /// Writes the executable to `dir/name`.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

fn add_name(table: &mut Vec<u8>, name: &str) -> u32 {
    let offset = table.len() as u32;
    table.extend_from_slice(name.as_bytes());
    table.push(0);
    offset
}

impl SectionHeader {
    const fn null() -> Self {
        Self {
            name: 0,
            kind: 0,
            flags: 0,
            addr: 0,
            offset: 0,
            size: 0,
            link: 0,
            info: 0,
            align: 0,
            entsize: 0,
        }
    }
}

/// `li r3, 0; blr`
pub const RETURN_ZERO: [u32; 2] = [0x3860_0000, 0x4E80_0020];

/// A program with code, initialized data and zero-initialized data:
///
/// * `.text` at 0x00: `_start` (words 0-1)
/// * `.data` at 0x10: `counter` (word 4) and `buffer` (words 6-7)
/// * `.bss` at 0x20: `flag` (word 8)
///
/// The program image spans words 0-7.
pub fn sample_program() -> ElfBuilder {
    ElfBuilder::new(&RETURN_ZERO)
        .data(0x10, &[42, 0, 0xDEAD_BEEF, 0x0000_0001])
        .bss(0x20, 4)
        .function("_start", 0x0, 8)
        .object("counter", 0x10, 4)
        .object("buffer", 0x18, 8)
        .symbol("flag", STT_OBJECT, BSS_SECTION, 0x20, 4)
        .symbol(".text", STT_SECTION, TEXT_SECTION, 0x0, 0)
        .symbol("_end", STT_NOTYPE, BSS_SECTION, 0x24, 0)
}
