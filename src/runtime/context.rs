//! The per-machine context slot.
//!
//! Context is an optional, machine-scoped value. It is readable from
//! reactions and child hooks through the capability object, but only
//! the transition function ever receives a setter for it.

use std::sync::{Arc, Mutex};

use super::lock;

/// Write handle for a machine's context slot.
///
/// A setter is injected into every transition function invocation and
/// nowhere else - this is what keeps context read-many/write-only-
/// through-transition. The write is visible to the very next capability
/// read, not deferred to commit time.
pub struct ContextSetter<C> {
    slot: Arc<Mutex<Option<C>>>,
}

impl<C> Clone for ContextSetter<C> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<C> ContextSetter<C> {
    pub(crate) fn new(slot: Arc<Mutex<Option<C>>>) -> Self {
        Self { slot }
    }

    /// Replace the machine's context value.
    pub fn set(&self, value: C) {
        *lock(&self.slot) = Some(value);
    }
}
