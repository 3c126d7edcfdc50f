//! Per-state child hooks.
//!
//! A children table associates at most one side-effect hook with each
//! state. The hook fires once per entry into that state (re-entries
//! included) and is spawned as a detached task - the engine never
//! awaits it. Hooks typically start timers or wire up nested machines
//! through the capability they receive.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::State;
use crate::runtime::handle::Capability;

/// A side-effect hook for one state.
///
/// The hook builds a future from the capability; the engine spawns that
/// future without keeping a handle to it. A failure inside the spawned
/// future is therefore unobserved - a known limitation, documented
/// rather than papered over.
pub type ChildHook<S, E, C> =
    Arc<dyn Fn(Capability<S, E, C>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Factory producing a children table for one machine instance.
///
/// Running the factory once per instance lets hooks share mutable
/// setup owned by that instance (a pomodoro machine's "next job" slot,
/// say). A literal table is just the degenerate factory that ignores
/// the capability.
pub type ChildrenFactory<S, E, C> =
    Arc<dyn Fn(&Capability<S, E, C>) -> Children<S, E, C> + Send + Sync>;

/// Mapping from state to at most one child hook.
///
/// # Example
///
/// ```rust
/// use flowstate::runtime::Children;
/// use flowstate::state_enum;
/// use flowstate::time::delay;
///
/// state_enum! {
///     enum Timer {
///         Started,
///         Ended,
///     }
///     final: [Ended]
/// }
///
/// let children: Children<Timer, (), u64> = Children::new().on(Timer::Started, |cap| async move {
///     let ms = cap.context().unwrap_or(0);
///     delay(ms).await;
///     let _ = cap.forward(()).await;
/// });
/// ```
pub struct Children<S: State, E, C> {
    hooks: HashMap<S, ChildHook<S, E, C>>,
}

impl<S: State, E, C> Default for Children<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E, C> Clone for Children<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<S: State, E, C> Children<S, E, C> {
    /// Create an empty children table.
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register the hook for a state, replacing any previous one.
    pub fn on<F, Fut>(mut self, state: S, hook: F) -> Self
    where
        F: Fn(Capability<S, E, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks
            .insert(state, Arc::new(move |cap| Box::pin(hook(cap))));
        self
    }

    pub(crate) fn get(&self, state: &S) -> Option<&ChildHook<S, E, C>> {
        self.hooks.get(state)
    }

    /// Whether any state has a hook registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Run the child hook registered for `state`, if any, detached.
///
/// Must be called from within a tokio runtime when a hook is present.
pub(crate) fn spawn_child_hook<S, E, C>(
    state: &S,
    capability: &Capability<S, E, C>,
    children: &Children<S, E, C>,
) where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    if let Some(hook) = children.get(state) {
        tokio::spawn(hook(capability.clone()));
    }
}
