//! # Image Loader Tests
//!
//! Command order of the load batch, symbol zero-fill and validation.

use ppuctl_core::channel::{Command, Generator, Target};
use ppuctl_core::common::{LoadError, PpuId};
use ppuctl_core::hal::{PpuControlRegister, PpuMemoryWord};
use ppuctl_core::image::{Symbol, SymbolTable, SymbolType};
use ppuctl_core::ppu::{LoadSequence, load};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::harness::{
    TestContext, block, block_writes, control_writes, object, program, symbols,
};
use crate::common::mocks::executor::untouched_executor;

#[test]
fn test_load_batch_shape() {
    let image = program(10);
    let table = symbols([("counter", object(20, 21)), ("buffer", object(30, 37))]);
    let sequence = LoadSequence::new(&image, &table, PpuId::TOP).unwrap();
    assert_eq!(sequence.program_region(), block(0, 9));
    let (builder, ()) = sequence.generate();
    let batch = builder.done();
    let commands = batch.commands();

    assert_eq!(commands.len(), 5);
    assert_eq!(batch.read_count(), 0);
    assert_eq!(
        control_writes(commands),
        vec![
            PpuControlRegister::held_in_reset(),
            PpuControlRegister::running()
        ]
    );
    assert!(matches!(
        commands.first(),
        Some(Command::Write { target: Target::ControlRegister(PpuId::TOP), .. })
    ));
    assert!(matches!(
        commands.last(),
        Some(Command::Write { target: Target::ControlRegister(PpuId::TOP), .. })
    ));

    let writes = block_writes(commands);
    assert_eq!(writes.len(), 3);
    let (program_index, program_block, payload) = writes[2];
    assert_eq!(program_index, 3);
    assert_eq!(program_block, block(0, 9));
    assert_eq!(payload, image.block().raw_words().as_slice());
}

#[test]
fn test_load_writes_memory_and_starts() {
    let mut ctx = TestContext::new();
    let image = program(4);
    ctx.load(&image, &SymbolTable::new()).unwrap();

    assert_eq!(ctx.memory().subblock(0, 4).unwrap(), *image.block());
    assert_eq!(ctx.target.control(ctx.ppu), PpuControlRegister::running());
    assert_eq!(ctx.target.history().len(), 1);
}

#[test]
fn test_load_clears_stale_symbol_storage() {
    let mut ctx = TestContext::new();
    for word in 100..110 {
        let _ = ctx.target
            .memory_mut(ctx.ppu)
            .set(word, PpuMemoryWord::new(0xBAD));
    }

    let table = symbols([("state", object(100, 104)), ("tail", object(108, 108))]);
    ctx.load(&program(8), &table).unwrap();

    let memory = ctx.memory();
    assert!((100..=104).all(|w| memory.get(w).unwrap().value() == 0));
    assert_eq!(memory.get(108).unwrap().value(), 0);
    assert_eq!(memory.get(106).unwrap().value(), 0xBAD);
}

#[test]
fn test_initialized_data_survives_zero_fill() {
    let mut ctx = TestContext::new();
    let image = program(8);
    let table = symbols([("counter", object(4, 4))]);
    ctx.load(&image, &table).unwrap();

    assert_eq!(ctx.memory().get(4), image.block().get(4));
}

#[test]
fn test_empty_program_rejected() {
    let mut mock = untouched_executor();
    let result = load(&mut mock, &program(0), &SymbolTable::new(), PpuId::TOP);
    assert!(matches!(result, Err(LoadError::EmptyProgram)));
}

#[test]
fn test_oversized_program_rejected() {
    let mut mock = untouched_executor();
    let result = load(&mut mock, &program(4097), &SymbolTable::new(), PpuId::TOP);
    assert!(matches!(
        result,
        Err(LoadError::ProgramTooLarge { words: 4097, capacity: 4096 })
    ));
}

#[test]
fn test_symbol_straddling_program_end_rejected() {
    let mut mock = untouched_executor();
    let table = symbols([("spill", object(8, 12))]);
    let result = load(&mut mock, &program(10), &table, PpuId::TOP);
    assert!(matches!(
        result,
        Err(LoadError::SymbolStraddlesProgram { ref name, .. }) if name == "spill"
    ));
}

#[test]
fn test_overlapping_objects_rejected() {
    let mut mock = untouched_executor();
    let table = symbols([("a", object(20, 25)), ("b", object(25, 30))]);
    let result = load(&mut mock, &program(10), &table, PpuId::TOP);
    assert!(matches!(
        result,
        Err(LoadError::SymbolOverlap { ref first, ref second }) if first == "a" && second == "b"
    ));
}

#[test]
fn test_aliases_and_functions_accepted() {
    let table = symbols([
        ("a", object(20, 25)),
        ("alias_of_a", object(20, 25)),
        ("main", Symbol::new(SymbolType::Function, block(0, 3))),
        ("helper", Symbol::new(SymbolType::Function, block(2, 5))),
    ]);
    assert!(LoadSequence::new(&program(10), &table, PpuId::TOP).is_ok());
}

fn symbol_table_strategy() -> impl Strategy<Value = SymbolTable> {
    prop::collection::btree_map("[a-z]{1,8}", (64u16..512, 0u16..8), 0..12).prop_map(|raw| {
        raw.into_iter()
            .map(|(name, (first, len))| {
                let kind = if first % 2 == 0 {
                    SymbolType::Function
                } else {
                    SymbolType::Other
                };
                (name, Symbol::new(kind, block(first, first + len)))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_program_write_spans_image_between_reset_and_run(words in 1usize..64) {
        let image = program(words);
        let (builder, ()) = LoadSequence::new(&image, &SymbolTable::new(), PpuId::BOTTOM)
            .unwrap()
            .generate();
        let batch = builder.done();
        let commands = batch.commands();

        let writes = block_writes(commands);
        prop_assert_eq!(writes.len(), 1);
        let (index, range, _) = writes[0];
        prop_assert_eq!(range, block(0, (words - 1) as u16));
        prop_assert_eq!(index, 1);
        prop_assert_eq!(commands.len(), 3);
        prop_assert_eq!(
            control_writes(commands),
            vec![PpuControlRegister::held_in_reset(), PpuControlRegister::running()]
        );
    }

    #[test]
    fn prop_every_symbol_zeroed_before_program(words in 1usize..64, table in symbol_table_strategy()) {
        let image = program(words);
        let (builder, ()) = LoadSequence::new(&image, &table, PpuId::TOP)
            .unwrap()
            .generate();
        let batch = builder.done();
        let writes = block_writes(batch.commands());

        let (program_index, program_range, _) = *writes.last().unwrap();
        prop_assert_eq!(program_range, block(0, (words - 1) as u16));
        for symbol in table.values() {
            let zeroed = writes.iter().any(|&(index, range, payload)| {
                index < program_index
                    && range == symbol.range
                    && payload.iter().all(|&w| w == 0)
            });
            prop_assert!(zeroed, "symbol {} not zeroed before program", symbol.range);
        }
    }
}
