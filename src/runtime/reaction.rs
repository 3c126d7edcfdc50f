//! Reaction tables and entry/exit dispatch.
//!
//! A reaction table maps states to optional entry/exit callbacks, plus
//! one wildcard bundle that matches every state. Specific and wildcard
//! callbacks are not mutually exclusive: on every dispatch the specific
//! callback runs first, then the wildcard one.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::State;
use crate::runtime::handle::Capability;

/// Callback invoked on state entry or exit.
///
/// Handlers receive the capability object rather than a raw state, so
/// they can read the live state/context and push further events. They
/// are fire-and-forget: return values are ignored, and a handler that
/// wants to do async work is expected to spawn it.
pub type ReactionHandler<S, E, C> = Arc<dyn Fn(Capability<S, E, C>) + Send + Sync>;

/// An optional entry/exit callback pair for one state.
pub struct ReactionBundle<S: State, E, C> {
    entry: Option<ReactionHandler<S, E, C>>,
    exit: Option<ReactionHandler<S, E, C>>,
}

impl<S: State, E, C> Default for ReactionBundle<S, E, C> {
    fn default() -> Self {
        Self {
            entry: None,
            exit: None,
        }
    }
}

impl<S: State, E, C> Clone for ReactionBundle<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            exit: self.exit.clone(),
        }
    }
}

/// Mapping from state to reaction callbacks, plus a wildcard bundle.
///
/// Supplied per run and fixed for the machine instance's lifetime.
///
/// # Example
///
/// ```rust
/// use flowstate::runtime::Reaction;
/// use flowstate::state_enum;
///
/// state_enum! {
///     enum Light {
///         Red,
///         Green,
///     }
/// }
///
/// let reaction: Reaction<Light, (), ()> = Reaction::new()
///     .entry(Light::Green, |cap| println!("now {:?}", cap.state()))
///     .exit(Light::Red, |_| println!("leaving red"))
///     .any_entry(|cap| println!("entered {:?}", cap.state()));
/// ```
pub struct Reaction<S: State, E, C> {
    by_state: HashMap<S, ReactionBundle<S, E, C>>,
    wildcard: ReactionBundle<S, E, C>,
}

impl<S: State, E, C> Default for Reaction<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E, C> Clone for Reaction<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            by_state: self.by_state.clone(),
            wildcard: self.wildcard.clone(),
        }
    }
}

impl<S: State, E, C> Reaction<S, E, C> {
    /// Create an empty reaction table.
    pub fn new() -> Self {
        Self {
            by_state: HashMap::new(),
            wildcard: ReactionBundle::default(),
        }
    }

    /// Register an entry callback for a specific state.
    pub fn entry<F>(mut self, state: S, handler: F) -> Self
    where
        F: Fn(Capability<S, E, C>) + Send + Sync + 'static,
    {
        self.by_state.entry(state).or_default().entry = Some(Arc::new(handler));
        self
    }

    /// Register an exit callback for a specific state.
    pub fn exit<F>(mut self, state: S, handler: F) -> Self
    where
        F: Fn(Capability<S, E, C>) + Send + Sync + 'static,
    {
        self.by_state.entry(state).or_default().exit = Some(Arc::new(handler));
        self
    }

    /// Register an entry callback fired for every state.
    pub fn any_entry<F>(mut self, handler: F) -> Self
    where
        F: Fn(Capability<S, E, C>) + Send + Sync + 'static,
    {
        self.wildcard.entry = Some(Arc::new(handler));
        self
    }

    /// Register an exit callback fired for every state.
    pub fn any_exit<F>(mut self, handler: F) -> Self
    where
        F: Fn(Capability<S, E, C>) + Send + Sync + 'static,
    {
        self.wildcard.exit = Some(Arc::new(handler));
        self
    }

    fn bundle(&self, state: &S) -> Option<&ReactionBundle<S, E, C>> {
        self.by_state.get(state)
    }
}

/// Fire exit callbacks for a state change.
///
/// A same-state transition never fires exit: the machine never
/// logically left the state. Otherwise the specific exit for `old`
/// runs, then the wildcard exit. The capability still observes the
/// pre-commit state at this point.
pub(crate) fn dispatch_exit<S: State, E, C>(
    old: &S,
    new: &S,
    capability: &Capability<S, E, C>,
    reaction: &Reaction<S, E, C>,
) {
    if old == new {
        return;
    }

    if let Some(handler) = reaction.bundle(old).and_then(|b| b.exit.as_ref()) {
        handler(capability.clone());
    }
    if let Some(handler) = reaction.wildcard.exit.as_ref() {
        handler(capability.clone());
    }
}

/// Fire entry callbacks for a state: specific first, then wildcard.
///
/// Entry fires on every entry, including re-entering the same state.
pub(crate) fn dispatch_entry<S: State, E, C>(
    state: &S,
    capability: &Capability<S, E, C>,
    reaction: &Reaction<S, E, C>,
) {
    if let Some(handler) = reaction.bundle(state).and_then(|b| b.entry.as_ref()) {
        handler(capability.clone());
    }
    if let Some(handler) = reaction.wildcard.entry.as_ref() {
        handler(capability.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::handle::Capability;
    use crate::state_enum;
    use std::sync::Mutex;

    state_enum! {
        enum Light {
            Red,
            Green,
        }
    }

    fn capability() -> Capability<Light, (), ()> {
        Capability::detached(Light::Red, None)
    }

    fn recording(
        log: &Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
    ) -> impl Fn(Capability<Light, (), ()>) {
        let log = Arc::clone(log);
        move |_| log.lock().unwrap().push(label)
    }

    #[test]
    fn same_state_never_fires_exit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reaction = Reaction::new()
            .exit(Light::Red, recording(&log, "specific"))
            .any_exit(recording(&log, "wildcard"));

        dispatch_exit(&Light::Red, &Light::Red, &capability(), &reaction);

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn exit_fires_specific_then_wildcard() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reaction = Reaction::new()
            .exit(Light::Red, recording(&log, "specific"))
            .any_exit(recording(&log, "wildcard"));

        dispatch_exit(&Light::Red, &Light::Green, &capability(), &reaction);

        assert_eq!(*log.lock().unwrap(), vec!["specific", "wildcard"]);
    }

    #[test]
    fn entry_fires_specific_then_wildcard() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reaction = Reaction::new()
            .entry(Light::Green, recording(&log, "specific"))
            .any_entry(recording(&log, "wildcard"));

        dispatch_entry(&Light::Green, &capability(), &reaction);

        assert_eq!(*log.lock().unwrap(), vec!["specific", "wildcard"]);
    }

    #[test]
    fn entry_fires_again_on_reentry() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reaction = Reaction::new().entry(Light::Green, recording(&log, "entry"));

        dispatch_entry(&Light::Green, &capability(), &reaction);
        dispatch_entry(&Light::Green, &capability(), &reaction);

        assert_eq!(*log.lock().unwrap(), vec!["entry", "entry"]);
    }

    #[test]
    fn unregistered_states_dispatch_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reaction = Reaction::new().entry(Light::Green, recording(&log, "entry"));

        dispatch_entry(&Light::Red, &capability(), &reaction);
        dispatch_exit(&Light::Green, &Light::Red, &capability(), &reaction);

        assert!(log.lock().unwrap().is_empty());
    }
}
