//! Builder API for assembling machine definitions.
//!
//! The builder is where the two user-facing function shapes are
//! normalized: sync or async transition functions both become the one
//! canonical async form, and a literal children table becomes the
//! canonical factory form.

pub mod error;
pub mod macros;

pub use error::BuildError;

use std::future::Future;
use std::sync::Arc;

use crate::core::State;
use crate::runtime::children::{Children, ChildrenFactory};
use crate::runtime::context::ContextSetter;
use crate::runtime::error::TransitionError;
use crate::runtime::handle::Capability;
use crate::runtime::machine::{table_factory, Machine};
use crate::runtime::TransitionFn;

/// Fluent builder for [`Machine`] definitions.
///
/// # Example
///
/// ```rust
/// use flowstate::builder::MachineBuilder;
/// use flowstate::state_enum;
///
/// state_enum! {
///     enum Phase {
///         Waiting,
///         Running,
///     }
/// }
///
/// #[derive(Debug)]
/// enum Event {
///     Go,
/// }
///
/// let machine = MachineBuilder::<Phase, Event, ()>::new()
///     .transition_sync(|_state, event, _cx| {
///         Ok(match event {
///             Event::Go => Phase::Running,
///         })
///     })
///     .build()
///     .unwrap();
/// # let _ = machine;
/// ```
pub struct MachineBuilder<S: State, E, C> {
    transition: Option<TransitionFn<S, E, C>>,
    children: Option<ChildrenFactory<S, E, C>>,
    initial_context: Option<C>,
}

impl<S, E, C> MachineBuilder<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            transition: None,
            children: None,
            initial_context: None,
        }
    }

    /// Set an asynchronous transition function (required, unless the
    /// sync form is used).
    pub fn transition<F, Fut>(mut self, transition: F) -> Self
    where
        F: Fn(S, E, ContextSetter<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, TransitionError>> + Send + 'static,
    {
        self.transition = Some(Arc::new(move |state, event, setter| {
            Box::pin(transition(state, event, setter))
        }));
        self
    }

    /// Set a synchronous transition function; it is normalized into
    /// the async form.
    pub fn transition_sync<F>(mut self, transition: F) -> Self
    where
        F: Fn(S, E, ContextSetter<C>) -> Result<S, TransitionError> + Send + Sync + 'static,
    {
        self.transition = Some(Arc::new(move |state, event, setter| {
            let result = transition(state, event, setter);
            Box::pin(async move { result })
        }));
        self
    }

    /// Attach a literal children table.
    pub fn children(mut self, children: Children<S, E, C>) -> Self {
        self.children = Some(table_factory(children));
        self
    }

    /// Attach a children factory, run once per started instance with
    /// that instance's capability. Use this when hooks need to share
    /// per-instance state.
    pub fn children_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Capability<S, E, C>) -> Children<S, E, C> + Send + Sync + 'static,
    {
        self.children = Some(Arc::new(factory));
        self
    }

    /// Set the default context new instances start with.
    pub fn initial_context(mut self, context: C) -> Self {
        self.initial_context = Some(context);
        self
    }

    /// Build the definition.
    pub fn build(self) -> Result<Machine<S, E, C>, BuildError> {
        let transition = self.transition.ok_or(BuildError::MissingTransition)?;
        let children = self
            .children
            .unwrap_or_else(|| table_factory(Children::new()));

        Ok(Machine {
            transition,
            children,
            initial_context: self.initial_context,
        })
    }
}

impl<S, E, C> Default for MachineBuilder<S, E, C>
where
    S: State + 'static,
    E: Send + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum Phase {
            Waiting,
            Running,
        }
    }

    #[derive(Debug)]
    enum Event {
        Go,
    }

    #[test]
    fn builder_requires_a_transition_function() {
        let result = MachineBuilder::<Phase, Event, ()>::new().build();
        assert!(matches!(result, Err(BuildError::MissingTransition)));
    }

    #[tokio::test]
    async fn sync_transition_is_normalized_to_async() {
        let machine = MachineBuilder::<Phase, Event, ()>::new()
            .transition_sync(|_state, event, _cx| {
                Ok(match event {
                    Event::Go => Phase::Running,
                })
            })
            .build()
            .unwrap();

        let handle = machine.handle(Phase::Waiting);
        let handle = handle.forward(Event::Go).await.unwrap();
        assert_eq!(handle.state(), &Phase::Running);
    }

    #[tokio::test]
    async fn async_transition_builds() {
        let machine = MachineBuilder::<Phase, Event, ()>::new()
            .transition(|_state, event, _cx| async move {
                Ok(match event {
                    Event::Go => Phase::Running,
                })
            })
            .build()
            .unwrap();

        let handle = machine.handle(Phase::Waiting);
        let handle = handle.forward(Event::Go).await.unwrap();
        assert_eq!(handle.state(), &Phase::Running);
    }

    #[tokio::test]
    async fn literal_children_table_is_accepted() {
        let children: Children<Phase, Event, ()> =
            Children::new().on(Phase::Running, |_cap| async {});

        let machine = MachineBuilder::new()
            .transition_sync(|_state, _event: Event, _cx| Ok(Phase::Running))
            .children(children)
            .build()
            .unwrap();

        // Hook for Waiting is absent; construction spawns nothing.
        let _handle = machine.handle(Phase::Waiting);
    }
}
