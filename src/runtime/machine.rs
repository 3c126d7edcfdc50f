//! The machine facade: definitions, run options, and the two driving
//! styles.
//!
//! A [`Machine`] is the assembled definition - transition function,
//! optional default context, children factory. From one definition any
//! number of independent instances can be started, in either of two
//! shapes: a functional [`Handle`] the caller threads through
//! successive `forward` calls, or a [`StateMachine`] wrapper that
//! tracks the current handle internally and exposes `advance`.

use std::sync::Arc;

use crate::core::{State, StateHistory, TransitionRecord};
use crate::runtime::children::{Children, ChildrenFactory};
use crate::runtime::error::TransitionError;
use crate::runtime::handle::{Capability, Handle, Inner};
use crate::runtime::reaction::Reaction;
use crate::runtime::TransitionFn;

/// One-shot hook run at construction, before the children factory.
pub type InitHook<S, E, C> = Arc<dyn Fn(Capability<S, E, C>) + Send + Sync>;

/// Per-run configuration for starting a machine instance.
pub struct RunOptions<S: State, E, C> {
    pub(crate) reaction: Reaction<S, E, C>,
    pub(crate) context: Option<C>,
    pub(crate) skip_initial_reaction: bool,
    pub(crate) init: Option<InitHook<S, E, C>>,
}

impl<S: State, E, C> Default for RunOptions<S, E, C> {
    fn default() -> Self {
        Self {
            reaction: Reaction::new(),
            context: None,
            skip_initial_reaction: false,
            init: None,
        }
    }
}

impl<S: State, E, C> RunOptions<S, E, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a reaction table to this run.
    pub fn reaction(mut self, reaction: Reaction<S, E, C>) -> Self {
        self.reaction = reaction;
        self
    }

    /// Override the definition's default context for this run.
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Suppress the initial entry reactions.
    ///
    /// Useful when wrapping a machine as a child of another, where the
    /// outer reaction system should be the sole observer of the start.
    /// The initial child hook still fires.
    pub fn skip_initial_reaction(mut self) -> Self {
        self.skip_initial_reaction = true;
        self
    }

    /// Run a one-shot hook against the capability at construction,
    /// before the children factory and the initial hook/reactions.
    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(Capability<S, E, C>) + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(hook));
        self
    }
}

/// An assembled machine definition.
///
/// Cheap to clone; each started instance gets its own tracked cell.
///
/// # Example
///
/// ```rust
/// use flowstate::runtime::Machine;
/// use flowstate::state_enum;
///
/// state_enum! {
///     enum Switch {
///         Off,
///         On,
///     }
/// }
///
/// #[derive(Debug)]
/// enum Event {
///     Toggle,
/// }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let machine: Machine<Switch, Event, ()> = Machine::builder()
///         .transition_sync(|state, event, _cx| {
///             Ok(match event {
///                 Event::Toggle => match state {
///                     Switch::Off => Switch::On,
///                     Switch::On => Switch::Off,
///                 },
///             })
///         })
///         .build()
///         .unwrap();
///
///     let handle = machine.handle(Switch::Off);
///     let handle = handle.forward(Event::Toggle).await.unwrap();
///     assert_eq!(handle.state(), &Switch::On);
/// }
/// ```
pub struct Machine<S: State, E, C> {
    pub(crate) transition: TransitionFn<S, E, C>,
    pub(crate) children: ChildrenFactory<S, E, C>,
    pub(crate) initial_context: Option<C>,
}

impl<S: State, E, C> Clone for Machine<S, E, C>
where
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transition: Arc::clone(&self.transition),
            children: Arc::clone(&self.children),
            initial_context: self.initial_context.clone(),
        }
    }
}

impl<S, E, C> Machine<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Start building a definition.
    pub fn builder() -> crate::builder::MachineBuilder<S, E, C> {
        crate::builder::MachineBuilder::new()
    }

    /// Start an instance in the functional style with default options.
    pub fn handle(&self, initial: S) -> Handle<S, E, C> {
        self.handle_with(initial, RunOptions::default())
    }

    /// Start an instance in the functional style.
    ///
    /// Construction behaves like any other entry into the initial
    /// state: the init hook runs, the children factory runs, the
    /// initial state's child hook is spawned, and entry reactions fire
    /// (unless suppressed). Must be called within a tokio runtime when
    /// children are configured.
    pub fn handle_with(&self, initial: S, options: RunOptions<S, E, C>) -> Handle<S, E, C> {
        let context = options.context.or_else(|| self.initial_context.clone());
        let inner = Inner::new(
            initial.clone(),
            context,
            Arc::clone(&self.transition),
            options.reaction,
        );

        let capability = Capability::from_inner(&inner);
        if let Some(init) = options.init {
            init(capability.clone());
        }

        inner.install_children((self.children)(&capability));
        inner.fire_child_hook(&initial);

        if !options.skip_initial_reaction {
            inner.fire_entry(&initial);
        }

        Handle::initial(&inner, initial)
    }

    /// Start an instance in the stateful style with default options.
    pub fn start(&self, initial: S) -> StateMachine<S, E, C> {
        self.start_with(initial, RunOptions::default())
    }

    /// Start an instance in the stateful style.
    pub fn start_with(&self, initial: S, options: RunOptions<S, E, C>) -> StateMachine<S, E, C> {
        let handle = self.handle_with(initial.clone(), options);
        StateMachine {
            current: initial,
            handle,
            history: StateHistory::new(),
        }
    }
}

/// The state/context pair returned from [`StateMachine::advance`].
#[derive(Clone, Debug)]
pub struct Advanced<S, C> {
    pub state: S,
    pub context: Option<C>,
}

/// Stateful wrapper over a machine instance.
///
/// A thin layer over the functional handle: each `advance` replaces
/// the private handle reference and records the transition. The
/// wrapper keeps its own current-state copy and uses it as the default
/// basis, so hook-driven transitions that land between two `advance`
/// calls do not shift the basis the caller reasons about - exit
/// reactions still fire for the instance's real previous state.
pub struct StateMachine<S: State, E, C> {
    current: S,
    handle: Handle<S, E, C>,
    history: StateHistory<S>,
}

impl<S, E, C> StateMachine<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Advance with the wrapper's own tracked state as the basis.
    pub async fn advance(&mut self, event: E) -> Result<Advanced<S, C>, TransitionError> {
        let basis = self.current.clone();
        self.advance_from(event, basis).await
    }

    /// Advance, computing the next state from an explicit basis.
    pub async fn advance_from(
        &mut self,
        event: E,
        basis: S,
    ) -> Result<Advanced<S, C>, TransitionError> {
        let from = self.current.clone();
        let next = self.handle.forward_from(event, basis).await?;

        self.current = next.state().clone();
        self.history = self
            .history
            .record(TransitionRecord::new(from, self.current.clone()));
        self.handle = next;

        Ok(Advanced {
            state: self.current.clone(),
            context: self.handle.context().cloned(),
        })
    }

    /// The state as of the last `advance` on this wrapper.
    pub fn state(&self) -> &S {
        &self.current
    }

    /// The machine's live context (detached hooks may have updated it
    /// since the last `advance`).
    pub fn context(&self) -> Option<C> {
        self.handle.capability().context()
    }

    /// A live capability onto the underlying instance.
    pub fn capability(&self) -> Capability<S, E, C> {
        self.handle.capability()
    }

    /// Whether the wrapper's tracked state is final.
    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }

    /// The transitions applied through this wrapper, in order.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }
}

/// Turn a literal children table into the canonical factory shape.
pub(crate) fn table_factory<S, E, C>(table: Children<S, E, C>) -> ChildrenFactory<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    Arc::new(move |_capability| table.clone())
}
