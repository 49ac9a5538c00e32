//! # Result Collector Tests
//!
//! Stop batch shape, exit code decoding and mailbox retrieval.

use ppuctl_core::channel::{Command, Generator, Target};
use ppuctl_core::common::{BlockOnPpu, ChannelError, CollectError, PpuId, WordOnPpu};
use ppuctl_core::hal::{PpuControlRegister, PpuMemoryBlock, PpuMemoryWord};
use ppuctl_core::ppu::{ExitCode, StopSequence, collect_result};
use ppuctl_core::sim::SimulatedTarget;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::control_writes;
use crate::common::mocks::executor::{MockChannel, failing_executor};

const SETTLE: u32 = 1000;

fn target_with(exit_word: u32, mailbox: &[u8]) -> SimulatedTarget {
    let mut target = SimulatedTarget::new();
    let memory = target.memory_mut(PpuId::TOP);
    let _ = memory.set(WordOnPpu::RETURN_CODE.index(), PpuMemoryWord::new(exit_word));
    memory
        .set_subblock(
            BlockOnPpu::MAILBOX.first().index(),
            &PpuMemoryBlock::from_be_bytes(mailbox),
        )
        .unwrap();
    target
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_halt_written_exactly_once(#[case] read_mailbox: bool) {
    let (builder, tickets) = StopSequence::new(PpuId::TOP, read_mailbox, SETTLE).generate();
    let batch = builder.done();

    assert_eq!(
        control_writes(batch.commands()),
        vec![PpuControlRegister::held_in_reset()]
    );
    assert_eq!(tickets.mailbox.is_some(), read_mailbox);
    assert_eq!(batch.read_count(), if read_mailbox { 2 } else { 1 });
}

#[test]
fn test_stop_batch_ends_with_settle_wait() {
    let (builder, _) = StopSequence::new(PpuId::BOTTOM, true, SETTLE).generate();
    let batch = builder.done();
    let commands = batch.commands();

    assert!(matches!(
        commands[0],
        Command::Write { target: Target::ControlRegister(PpuId::BOTTOM), .. }
    ));
    assert!(matches!(
        commands[1],
        Command::Read { target: Target::MemoryWord(coord) } if coord.word == WordOnPpu::RETURN_CODE
    ));
    assert!(matches!(
        commands[2],
        Command::Read { target: Target::MemoryBlock(coord) } if coord.block == BlockOnPpu::MAILBOX
    ));
    assert_eq!(
        commands[3],
        Command::Write {
            target: Target::Timer,
            words: vec![0]
        }
    );
    assert!(matches!(commands[4], Command::WaitUntil { cycles: SETTLE, .. }));
}

#[rstest]
#[case(0xFFFF_FFFF, -1)]
#[case(0x0000_0001, 1)]
#[case(0x0000_0000, 0)]
#[case(0x8000_0000, i32::MIN)]
fn test_exit_code_sign(#[case] raw: u32, #[case] expected: i32) {
    let mut target = target_with(raw, b"");
    let result = collect_result(&mut target, PpuId::TOP, false, SETTLE).unwrap();
    assert_eq!(result.exit_code.value(), expected);
    assert_eq!(result.exit_code, ExitCode::from_raw(raw));
    assert_eq!(result.mailbox, None);
}

#[test]
fn test_mailbox_text() {
    let mut target = target_with(0, b"done\0\0\0\0");
    let result = collect_result(&mut target, PpuId::TOP, true, SETTLE).unwrap();
    assert_eq!(result.mailbox.as_deref(), Some("done"));
    assert!(result.exit_code.is_success());
}

#[test]
fn test_stop_halts_processor() {
    let mut target = target_with(0, b"");
    ppuctl_core::ppu::set_running(&mut target, PpuId::TOP).unwrap();

    let _ = collect_result(&mut target, PpuId::TOP, false, SETTLE).unwrap();
    assert_eq!(target.control(PpuId::TOP), PpuControlRegister::held_in_reset());
    assert_eq!(target.now(), u64::from(SETTLE));
}

#[test]
fn test_channel_failure_propagates() {
    let mut mock = failing_executor(ChannelError::Disconnected);
    let result = collect_result(&mut mock, PpuId::TOP, true, SETTLE);
    assert!(matches!(
        result,
        Err(CollectError::Channel(ChannelError::Disconnected))
    ));
}

#[test]
fn test_missing_response_propagates() {
    let mut mock = MockChannel::new();
    let _ = mock.expect_submit().times(1).returning(|_| Ok(vec![vec![0]]));

    let result = collect_result(&mut mock, PpuId::TOP, true, SETTLE);
    assert!(matches!(
        result,
        Err(CollectError::Channel(ChannelError::ResponseCount { expected: 2, actual: 1 }))
    ));
}
