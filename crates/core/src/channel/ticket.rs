//! Deferred read results.
//!
//! A ticket is handed out when a read is added to a batch and is filled in when the batch
//! runs. Reading it earlier is an ordering bug in the caller and yields
//! `TicketError::NotYetAvailable` rather than a default value.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::Target;
use crate::common::TicketError;
use crate::hal::Container;

/// Storage shared between a ticket and the batch that resolves it.
pub(crate) type ResultSlot = Rc<RefCell<Option<Vec<u32>>>>;

/// Handle to the result of a read that may not have executed yet.
pub struct Ticket<C> {
    target: Target,
    slot: ResultSlot,
    _container: PhantomData<C>,
}

impl<C: Container> Ticket<C> {
    pub(crate) fn new(target: Target, slot: ResultSlot) -> Self {
        Self {
            target,
            slot,
            _container: PhantomData,
        }
    }

    /// Returns the read container.
    ///
    /// # Returns
    ///
    /// The decoded container, or `TicketError::NotYetAvailable` if the owning batch has
    /// not run (or its last run failed).
    pub fn get(&self) -> Result<C, TicketError> {
        self.slot
            .borrow()
            .as_deref()
            .map(C::decode)
            .ok_or(TicketError::NotYetAvailable {
                target: self.target,
            })
    }

    /// Returns whether the result is available.
    pub fn is_valid(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Target the read was issued for.
    pub const fn target(&self) -> &Target {
        &self.target
    }
}

impl<C> fmt::Debug for Ticket<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("target", &self.target)
            .field("valid", &self.slot.borrow().is_some())
            .finish()
    }
}
