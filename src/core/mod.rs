//! Core building blocks for state machines.
//!
//! This module contains the dependency-light pieces the runtime is
//! assembled from:
//!
//! - `state`: the `State` trait all machine states implement
//! - `history`: immutable tracking of transitions over time

pub mod history;
pub mod state;

pub use history::{StateHistory, TransitionRecord};
pub use state::State;
