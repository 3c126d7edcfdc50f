//! The transition engine: capabilities, handles, and `forward`.
//!
//! Every machine instance owns exactly one tracked-state cell and one
//! context slot, both confined to the instance's shared inner value.
//! Handles and capabilities are lightweight views onto that inner
//! value: all of them observe and advance the same instance.

use std::sync::{Arc, Mutex, OnceLock};

use crate::core::State;
use crate::runtime::children::{spawn_child_hook, Children};
use crate::runtime::context::ContextSetter;
use crate::runtime::error::TransitionError;
use crate::runtime::lock;
use crate::runtime::reaction::{dispatch_entry, dispatch_exit, Reaction};
use crate::runtime::TransitionFn;

/// Shared per-instance machine data.
///
/// The children table is filled in once at construction, after the
/// factory has run against a capability borrowing this same value.
pub(crate) struct Inner<S: State, E, C> {
    state: Mutex<S>,
    context: Arc<Mutex<Option<C>>>,
    transition: TransitionFn<S, E, C>,
    reaction: Reaction<S, E, C>,
    children: OnceLock<Children<S, E, C>>,
}

impl<S, E, C> Inner<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        initial: S,
        context: Option<C>,
        transition: TransitionFn<S, E, C>,
        reaction: Reaction<S, E, C>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(initial),
            context: Arc::new(Mutex::new(context)),
            transition,
            reaction,
            children: OnceLock::new(),
        })
    }

    pub(crate) fn install_children(&self, children: Children<S, E, C>) {
        let _ = self.children.set(children);
    }

    pub(crate) fn fire_child_hook(self: &Arc<Self>, state: &S) {
        if let Some(children) = self.children.get() {
            spawn_child_hook(state, &Capability::from_inner(self), children);
        }
    }

    pub(crate) fn fire_entry(self: &Arc<Self>, state: &S) {
        dispatch_entry(state, &Capability::from_inner(self), &self.reaction);
    }

    fn tracked_state(&self) -> S {
        lock(&self.state).clone()
    }

    fn tracked_context(&self) -> Option<C> {
        lock(&self.context).clone()
    }

    /// Advance the machine: the one place transitions are sequenced.
    ///
    /// Ordering within a call: read previous -> await the transition
    /// function -> exit dispatch (against the *actual* previous state,
    /// pre-commit) -> commit -> detached child hook -> entry dispatch.
    /// A failing transition function returns before the commit, so the
    /// tracked state is left untouched.
    async fn advance(
        self: &Arc<Self>,
        event: E,
        basis: Option<S>,
    ) -> Result<Handle<S, E, C>, TransitionError> {
        let previous = self.tracked_state();
        let basis = basis.unwrap_or_else(|| previous.clone());
        let setter = ContextSetter::new(Arc::clone(&self.context));

        let next = (self.transition)(basis, event, setter).await?;

        let capability = Capability::from_inner(self);

        // Exit reflects the machine's real history even when the caller
        // supplied a synthetic basis; the capability still reads the
        // pre-commit state here.
        dispatch_exit(&previous, &next, &capability, &self.reaction);

        *lock(&self.state) = next.clone();

        self.fire_child_hook(&next);
        self.fire_entry(&next);

        Ok(Handle {
            state: next,
            context: self.tracked_context(),
            inner: Arc::clone(self),
        })
    }
}

/// Live accessor to a machine instance ("obtain").
///
/// Reactions and child hooks receive a capability instead of raw
/// state. Its reads are evaluated at call time against the instance's
/// tracked cell, never against a snapshot, so a hook registered once
/// keeps observing up-to-date data across later transitions. Cloning
/// is cheap and every clone refers to the same instance.
pub struct Capability<S: State, E, C> {
    inner: Arc<Inner<S, E, C>>,
}

impl<S: State, E, C> Clone for Capability<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, E, C> Capability<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    pub(crate) fn from_inner(inner: &Arc<Inner<S, E, C>>) -> Self {
        Self {
            inner: Arc::clone(inner),
        }
    }

    /// The machine's currently tracked state.
    pub fn state(&self) -> S {
        self.inner.tracked_state()
    }

    /// The machine's current context, if any.
    pub fn context(&self) -> Option<C> {
        self.inner.tracked_context()
    }

    /// Push an event into the machine this capability belongs to.
    pub async fn forward(&self, event: E) -> Result<Handle<S, E, C>, TransitionError> {
        self.inner.advance(event, None).await
    }

    /// Push an event, computing the next state from `basis` instead of
    /// the tracked state. Exit reactions still fire for the state the
    /// machine was actually in.
    pub async fn forward_from(
        &self,
        event: E,
        basis: S,
    ) -> Result<Handle<S, E, C>, TransitionError> {
        self.inner.advance(event, Some(basis)).await
    }

    /// Capability over a fresh instance that ignores events, for tests
    /// that only exercise dispatch plumbing.
    #[cfg(test)]
    pub(crate) fn detached(state: S, context: Option<C>) -> Self {
        let transition: TransitionFn<S, E, C> =
            Arc::new(|s, _e, _setter| Box::pin(async move { Ok(s) }));
        let inner = Inner::new(state, context, transition, Reaction::new());
        Self { inner }
    }
}

/// The `{state, forward, context}` triple returned from each transition.
///
/// `state` and `context` are the values observed when this handle was
/// produced; `forward` advances the machine further and yields a new
/// handle. Handles produced by one instance all drive the same tracked
/// cell - calling an old handle again does not fork history.
pub struct Handle<S: State, E, C> {
    state: S,
    context: Option<C>,
    inner: Arc<Inner<S, E, C>>,
}

impl<S: State, E, C> Clone for Handle<S, E, C>
where
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            context: self.context.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, E, C> Handle<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    pub(crate) fn initial(inner: &Arc<Inner<S, E, C>>, state: S) -> Self {
        Self {
            state,
            context: inner.tracked_context(),
            inner: Arc::clone(inner),
        }
    }

    /// The state observed when this handle was produced.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The context observed when this handle was produced.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// A live capability onto the same machine instance.
    pub fn capability(&self) -> Capability<S, E, C> {
        Capability::from_inner(&self.inner)
    }

    /// Advance the machine with `event` and return the next handle.
    pub async fn forward(&self, event: E) -> Result<Handle<S, E, C>, TransitionError> {
        self.inner.advance(event, None).await
    }

    /// Advance the machine, computing the next state from `basis`
    /// rather than the tracked state ("pretend we were in `basis`").
    /// Exit reactions still fire for the actual previous state.
    pub async fn forward_from(
        &self,
        event: E,
        basis: S,
    ) -> Result<Handle<S, E, C>, TransitionError> {
        self.inner.advance(event, Some(basis)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum Switch {
            Off,
            On,
        }
    }

    fn toggle_inner() -> Arc<Inner<Switch, (), ()>> {
        let transition: TransitionFn<Switch, (), ()> = Arc::new(|s, _e, _setter| {
            Box::pin(async move {
                Ok(match s {
                    Switch::Off => Switch::On,
                    Switch::On => Switch::Off,
                })
            })
        });
        Inner::new(Switch::Off, None, transition, Reaction::new())
    }

    #[tokio::test]
    async fn forward_advances_the_tracked_state() {
        let inner = toggle_inner();
        let handle = Handle::initial(&inner, Switch::Off);

        let handle = handle.forward(()).await.unwrap();
        assert_eq!(handle.state(), &Switch::On);

        let handle = handle.forward(()).await.unwrap();
        assert_eq!(handle.state(), &Switch::Off);
    }

    #[tokio::test]
    async fn old_handles_share_the_same_cell() {
        let inner = toggle_inner();
        let first = Handle::initial(&inner, Switch::Off);

        let _second = first.forward(()).await.unwrap();

        // Advancing through the stale first handle still observes the
        // instance's real tracked state as its starting point.
        let third = first.forward(()).await.unwrap();
        assert_eq!(third.state(), &Switch::Off);
    }

    #[tokio::test]
    async fn capability_reads_are_live() {
        let inner = toggle_inner();
        let handle = Handle::initial(&inner, Switch::Off);
        let capability = handle.capability();

        assert_eq!(capability.state(), Switch::Off);
        let _ = handle.forward(()).await.unwrap();
        assert_eq!(capability.state(), Switch::On);
    }

    #[tokio::test]
    async fn basis_override_computes_from_the_supplied_state() {
        let inner = toggle_inner();
        let handle = Handle::initial(&inner, Switch::Off);

        // Tracked state is Off; pretend we were On.
        let next = handle.forward_from((), Switch::On).await.unwrap();
        assert_eq!(next.state(), &Switch::Off);
    }

    #[tokio::test]
    async fn failing_transition_leaves_state_uncommitted() {
        let transition: TransitionFn<Switch, (), ()> = Arc::new(|_s, _e, _setter| {
            Box::pin(async move { Err(TransitionError::rejected("nope")) })
        });
        let inner = Inner::new(Switch::Off, None, transition, Reaction::new());
        let handle = Handle::initial(&inner, Switch::Off);

        let result = handle.forward(()).await;
        assert!(result.is_err());
        assert_eq!(handle.capability().state(), Switch::Off);
    }
}
