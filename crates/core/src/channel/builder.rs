//! Batch assembly.
//!
//! `BatchBuilder` collects commands in the order they are added; `done` freezes them into a
//! `Batch`. A batch can be run any number of times; each run refreshes its tickets.

use std::cell::RefCell;
use std::rc::Rc;

use super::ticket::{ResultSlot, Ticket};
use super::{Command, Coordinate};
use crate::common::{ChannelError, TimerOnDls};
use crate::hal::Container;

/// Sequential builder for a [`Batch`].
#[derive(Debug, Default)]
pub struct BatchBuilder {
    commands: Vec<Command>,
    slots: Vec<ResultSlot>,
}

impl BatchBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a write of `value` to `coord`.
    pub fn write<K: Coordinate>(&mut self, coord: &K, value: &K::Container) {
        self.commands.push(Command::Write {
            target: coord.target(),
            words: value.encode(),
        });
    }

    /// Appends a read of `coord`.
    ///
    /// # Returns
    ///
    /// A ticket resolved once the finished batch has been run.
    pub fn read<K: Coordinate>(&mut self, coord: &K) -> Ticket<K::Container> {
        let target = coord.target();
        let slot: ResultSlot = Rc::new(RefCell::new(None));
        self.commands.push(Command::Read { target });
        self.slots.push(Rc::clone(&slot));
        Ticket::new(target, slot)
    }

    /// Appends a wait until `timer` reaches `cycles`.
    pub fn wait_until(&mut self, timer: TimerOnDls, cycles: u32) {
        self.commands.push(Command::WaitUntil { timer, cycles });
    }

    /// Appends all commands of `other`, keeping its tickets connected.
    pub fn merge_back(&mut self, other: Self) {
        self.commands.extend(other.commands);
        self.slots.extend(other.slots);
    }

    /// Number of commands added so far.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns whether no command has been added.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Finishes the batch.
    pub fn done(self) -> Batch {
        Batch {
            commands: self.commands,
            slots: self.slots,
        }
    }
}

/// A finished, ordered set of commands executed as one unit.
#[derive(Debug, Default)]
pub struct Batch {
    commands: Vec<Command>,
    slots: Vec<ResultSlot>,
}

impl Batch {
    /// Commands in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of reads, i.e. of responses a run must deliver.
    pub fn read_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether the batch holds no command.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops the results of any previous run.
    pub(crate) fn invalidate(&self) {
        for slot in &self.slots {
            *slot.borrow_mut() = None;
        }
    }

    /// Hands read responses to the tickets.
    ///
    /// All responses are checked before any ticket is filled, so either every ticket of
    /// the batch becomes valid or none does.
    pub(crate) fn resolve(&self, responses: Vec<Vec<u32>>) -> Result<(), ChannelError> {
        if responses.len() != self.slots.len() {
            return Err(ChannelError::ResponseCount {
                expected: self.slots.len(),
                actual: responses.len(),
            });
        }

        let targets = self.commands.iter().filter_map(|command| match command {
            Command::Read { target } => Some(target),
            _ => None,
        });
        for (target, response) in targets.zip(&responses) {
            let expected = target.size_in_words();
            if response.len() != expected {
                return Err(ChannelError::ResponseSize {
                    target: *target,
                    expected,
                    actual: response.len(),
                });
            }
        }

        for (slot, response) in self.slots.iter().zip(responses) {
            *slot.borrow_mut() = Some(response);
        }
        Ok(())
    }
}
