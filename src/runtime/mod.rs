//! The combinator runtime: transition sequencing, reaction dispatch,
//! and hierarchical child hooks.
//!
//! # Concurrency model
//!
//! Work is cooperative: suspension happens only at `await` points
//! inside transition functions and inside whatever child hooks spawn.
//! Within one `forward` call the ordering is fixed: exit dispatch,
//! commit, child-hook spawn, entry dispatch.
//!
//! Child hooks are detached on purpose. A hook that sleeps and then
//! pushes an event races with whatever the original caller does next;
//! whichever future resumes first observes the other's commit as its
//! previous state. Serializing them would break autonomous hook-driven
//! machines (timers), so the race is documented, not removed. The
//! corollary: transition functions must treat out-of-context events as
//! no-ops rather than assume anything about the prior state, because a
//! pending hook cannot be cancelled.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;

pub mod children;
pub mod context;
pub mod error;
pub mod handle;
pub mod machine;
pub mod reaction;

pub use children::{ChildHook, Children, ChildrenFactory};
pub use context::ContextSetter;
pub use error::TransitionError;
pub use handle::{Capability, Handle};
pub use machine::{Advanced, InitHook, Machine, RunOptions, StateMachine};
pub use reaction::{Reaction, ReactionBundle, ReactionHandler};

/// The normalized transition function shape.
///
/// Pure with respect to state and event; its only sanctioned side
/// effect is the supplied context setter. The builder wraps both sync
/// and async user functions into this form.
pub type TransitionFn<S, E, C> =
    Arc<dyn Fn(S, E, ContextSetter<C>) -> BoxFuture<'static, Result<S, TransitionError>> + Send + Sync>;

/// Lock a cell, recovering the guard if a reaction panicked mid-hold.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
