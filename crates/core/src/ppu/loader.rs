//! Image Loader.
//!
//! Loading is one batch with a fixed shape:
//! 1. **Reset:** The PPU is held in reset so it never executes a half-written program.
//! 2. **Symbol zero-fill:** Every symbol range is overwritten with zeros, because symbol
//!    storage outside the image keeps its contents between runs.
//! 3. **Program:** The image is written to `[0, N-1]`.
//! 4. **Run:** The reset is released. This is the last command of the batch.
//!
//! The image and symbol table are validated before anything is submitted.

use tracing::{debug, info};

use super::control::{push_reset, push_run};
use crate::channel::{BatchBuilder, Executor, Generator};
use crate::common::constants::PPU_MEMORY_WORDS;
use crate::common::{BlockOnDls, BlockOnPpu, LoadError, PpuId};
use crate::hal::PpuMemoryBlock;
use crate::image::{ProgramImage, SymbolTable, SymbolType};

/// Validated load of one program onto one PPU.
#[derive(Debug)]
pub struct LoadSequence<'a> {
    image: &'a ProgramImage,
    symbols: &'a SymbolTable,
    program: BlockOnPpu,
    ppu: PpuId,
}

impl<'a> LoadSequence<'a> {
    /// Checks `image` and `symbols` and prepares the load.
    ///
    /// # Arguments
    ///
    /// * `image` - Program words, written from word 0.
    /// * `symbols` - Symbol ranges to zero-fill.
    /// * `ppu` - Target processor.
    ///
    /// # Returns
    ///
    /// The sequence, or a `LoadError` if the program is empty or too large, a symbol
    /// starts inside the program region but ends beyond it, or two data symbols partially
    /// overlap. Symbols with identical ranges are aliases and accepted.
    pub fn new(
        image: &'a ProgramImage,
        symbols: &'a SymbolTable,
        ppu: PpuId,
    ) -> Result<Self, LoadError> {
        if image.is_empty() {
            return Err(LoadError::EmptyProgram);
        }
        let too_large = || LoadError::ProgramTooLarge {
            words: image.size(),
            capacity: PPU_MEMORY_WORDS,
        };
        if image.size() > usize::from(PPU_MEMORY_WORDS) {
            return Err(too_large());
        }
        let program = BlockOnPpu::from_origin(image.size()).map_err(|_| too_large())?;

        for (name, symbol) in symbols {
            let range = symbol.range;
            if program.contains(range.first()) && !program.contains(range.last()) {
                return Err(LoadError::SymbolStraddlesProgram {
                    name: name.clone(),
                    range,
                    program,
                });
            }
        }

        let objects: Vec<_> = symbols
            .iter()
            .filter(|(_, symbol)| symbol.kind == SymbolType::Object)
            .collect();
        for (index, (first, a)) in objects.iter().enumerate() {
            for (second, b) in &objects[index + 1..] {
                if a.range != b.range && a.range.intersects(&b.range) {
                    return Err(LoadError::SymbolOverlap {
                        first: (*first).clone(),
                        second: (*second).clone(),
                    });
                }
            }
        }

        Ok(Self {
            image,
            symbols,
            program,
            ppu,
        })
    }

    /// Region the program occupies.
    pub const fn program_region(&self) -> BlockOnPpu {
        self.program
    }
}

impl Generator for LoadSequence<'_> {
    type Output = ();

    fn generate(&self) -> (BatchBuilder, Self::Output) {
        let mut builder = BatchBuilder::new();
        push_reset(&mut builder, self.ppu);

        for symbol in self.symbols.values() {
            let zeros = PpuMemoryBlock::zeroed(symbol.range.size());
            builder.write(&BlockOnDls::new(symbol.range, self.ppu), &zeros);
        }

        builder.write(&BlockOnDls::new(self.program, self.ppu), self.image.block());
        push_run(&mut builder, self.ppu);
        (builder, ())
    }
}

/// Writes `image` to `ppu`, zero-fills every symbol and starts execution.
///
/// # Returns
///
/// `Ok(())` once the load batch has executed. Validation failures are reported before any
/// command is submitted; channel failures are propagated unchanged.
pub fn load<E: Executor + ?Sized>(
    executor: &mut E,
    image: &ProgramImage,
    symbols: &SymbolTable,
    ppu: PpuId,
) -> Result<(), LoadError> {
    let sequence = LoadSequence::new(image, symbols, ppu)?;
    let (builder, ()) = sequence.generate();
    debug!(%ppu, commands = builder.len(), "submitting load batch");
    executor.run(&builder.done())?;
    info!(
        %ppu,
        words = image.size(),
        symbols = symbols.len(),
        "program loaded and started"
    );
    Ok(())
}
