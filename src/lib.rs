//! Flowstate: a functional state machine runtime.
//!
//! A machine is defined by a state space, an event space, an optional
//! shared context, a pure transition function, and two kinds of
//! observers: reactions (entry/exit callbacks fired on state changes)
//! and children (per-state side-effect hooks, typically used to start
//! timers or nested machines).
//!
//! # Core Concepts
//!
//! - **State**: type-safe states via the [`core::State`] trait
//! - **Transition function**: `(state, event, context setter) -> state`,
//!   sync or async, the one place allowed to update context
//! - **Reaction**: entry/exit callbacks keyed by state plus a wildcard
//! - **Children**: fire-once-per-entry hooks that receive a live
//!   capability and can autonomously drive the machine
//! - **Two driving styles**: a functional handle threaded through
//!   `forward` calls, or a stateful wrapper exposing `advance`
//!
//! # Example
//!
//! ```rust
//! use flowstate::runtime::{Machine, Reaction, RunOptions};
//! use flowstate::state_enum;
//!
//! state_enum! {
//!     pub enum Switch {
//!         Off,
//!         On,
//!     }
//! }
//!
//! #[derive(Clone, Debug)]
//! pub enum Event {
//!     Toggle,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let machine: Machine<Switch, Event, ()> = Machine::builder()
//!         .transition_sync(|state, event, _cx| {
//!             Ok(match event {
//!                 Event::Toggle => match state {
//!                     Switch::Off => Switch::On,
//!                     Switch::On => Switch::Off,
//!                 },
//!             })
//!         })
//!         .build()
//!         .unwrap();
//!
//!     let reaction = Reaction::new()
//!         .entry(Switch::On, |cap| println!("entered {:?}", cap.state()))
//!         .exit(Switch::Off, |_| println!("leaving Off"));
//!
//!     let mut switch = machine.start_with(Switch::Off, RunOptions::new().reaction(reaction));
//!     let advanced = switch.advance(Event::Toggle).await.unwrap();
//!     assert_eq!(advanced.state, Switch::On);
//! }
//! ```

pub mod builder;
pub mod core;
pub mod runtime;
pub mod time;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use core::{State, StateHistory, TransitionRecord};
pub use runtime::{
    Advanced, Capability, Children, ContextSetter, Handle, Machine, Reaction, RunOptions,
    StateMachine, TransitionError,
};
