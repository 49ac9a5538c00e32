//! Completion Poller.
//!
//! Each iteration submits the same three-command batch: read the status register, reset
//! the timer, wait until the timer reaches `W`. Waits are fixed-size; a batch costs about
//! the same round trip whatever it waits for, so coarse steps keep round trips rare.
//!
//! With a cycle budget `T`, the poller gives up once more than `T / W` iterations have
//! seen the PPU awake. The first iteration always completes before the budget is checked.

use tracing::{debug, trace, warn};

use crate::channel::{BatchBuilder, Executor, Generator, Ticket};
use crate::common::{PpuId, TimeoutError, TimerOnDls, WaitError};
use crate::hal::{PpuStatusRegister, Timer};

/// One poll iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSequence {
    ppu: PpuId,
    wait_cycles: u32,
}

impl PollSequence {
    /// Creates the iteration for `ppu`, waiting `wait_cycles` on the target.
    pub const fn new(ppu: PpuId, wait_cycles: u32) -> Self {
        Self { ppu, wait_cycles }
    }
}

impl Generator for PollSequence {
    type Output = Ticket<PpuStatusRegister>;

    fn generate(&self) -> (BatchBuilder, Self::Output) {
        let mut builder = BatchBuilder::new();
        let status = builder.read(&self.ppu.status_register());
        builder.write(&TimerOnDls, &Timer::new(0));
        builder.wait_until(TimerOnDls, self.wait_cycles);
        (builder, status)
    }
}

/// Blocks until `ppu` sleeps or the cycle budget is spent.
///
/// # Arguments
///
/// * `executor` - Channel to the target.
/// * `ppu` - Processor to poll.
/// * `timeout_cycles` - Cycle budget; `None` polls forever.
/// * `wait_cycles` - Target-side wait per iteration (`W`).
///
/// # Returns
///
/// `Ok(())` as soon as a status read reports sleep, `WaitError::Timeout` once the budget
/// ran out, or the channel failure of the failing iteration. A zero `wait_cycles` fails
/// with `WaitError::ZeroWait` before anything is submitted.
pub fn await_completion<E: Executor + ?Sized>(
    executor: &mut E,
    ppu: PpuId,
    timeout_cycles: Option<u64>,
    wait_cycles: u32,
) -> Result<(), WaitError> {
    if wait_cycles == 0 {
        return Err(WaitError::ZeroWait);
    }
    let wait = u64::from(wait_cycles);
    let max_iterations = timeout_cycles.map(|timeout| timeout / wait);
    debug!(%ppu, ?timeout_cycles, wait_cycles, ?max_iterations, "awaiting completion");

    let (builder, status) = PollSequence::new(ppu, wait_cycles).generate();
    let batch = builder.done();
    let mut iterations: u64 = 0;

    loop {
        executor.run(&batch)?;
        if status.get()?.sleep() {
            debug!(%ppu, iterations, "PPU went to sleep");
            return Ok(());
        }

        iterations += 1;
        trace!(%ppu, iterations, "PPU still running");
        if max_iterations.is_some_and(|max| iterations > max) {
            let error = TimeoutError {
                ppu,
                iterations,
                waited_cycles: iterations.saturating_mul(wait),
            };
            warn!(%error, "timed out waiting for completion");
            return Err(error.into());
        }
    }
}
