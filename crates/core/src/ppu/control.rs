//! Run/Halt State Controller.
//!
//! The control register is written with two values only:
//! * `held_in_reset` before loading (assert reset) and after completion (end the program),
//! * `running` to release the reset and start execution at word 0.
//!
//! The register is never read back.

use tracing::debug;

use crate::channel::{BatchBuilder, Executor};
use crate::common::{ChannelError, PpuId};
use crate::hal::PpuControlRegister;

/// Appends a write holding `ppu` in reset.
pub(crate) fn push_reset(builder: &mut BatchBuilder, ppu: PpuId) {
    builder.write(&ppu.control_register(), &PpuControlRegister::held_in_reset());
}

/// Appends a write releasing `ppu` from reset.
pub(crate) fn push_run(builder: &mut BatchBuilder, ppu: PpuId) {
    builder.write(&ppu.control_register(), &PpuControlRegister::running());
}

/// Releases the reset of `ppu` in a single-command batch.
pub fn set_running<E: Executor + ?Sized>(executor: &mut E, ppu: PpuId) -> Result<(), ChannelError> {
    let mut builder = BatchBuilder::new();
    push_run(&mut builder, ppu);
    executor.run(&builder.done())?;
    debug!(%ppu, "released reset");
    Ok(())
}

/// Holds `ppu` in reset in a single-command batch.
///
/// Issued after completion, the same write tells the PPU runtime that the program ended.
pub fn set_reset<E: Executor + ?Sized>(executor: &mut E, ppu: PpuId) -> Result<(), ChannelError> {
    let mut builder = BatchBuilder::new();
    push_reset(&mut builder, ppu);
    executor.run(&builder.done())?;
    debug!(%ppu, "asserted reset");
    Ok(())
}
