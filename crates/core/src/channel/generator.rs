//! Reusable command sequences.
//!
//! A generator produces a filled builder plus whatever handles the caller needs afterwards
//! (tickets, summaries). Anything implementing [`Generator`] can be passed where a sequence
//! is expected; the load, poll and stop sequences of the controller are generators.

use super::BatchBuilder;

/// Produces an ordered command sequence.
pub trait Generator {
    /// Handles returned alongside the builder, e.g. tickets for reads in the sequence.
    type Output;

    /// Builds the sequence.
    fn generate(&self) -> (BatchBuilder, Self::Output);
}

/// Runs `generator` and returns its builder and output.
pub fn generate<G: Generator + ?Sized>(generator: &G) -> (BatchBuilder, G::Output) {
    generator.generate()
}
