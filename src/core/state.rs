//! Core State trait for state machine states.
//!
//! States form a finite, comparable, enumerable domain. Reaction and
//! children tables key their lookups by state, so states must also be
//! hashable.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// States are immutable values describing the current position in a
/// machine. Equality is by value.
///
/// # Required Traits
///
/// - `Clone`: states are copied into handles and history records
/// - `Eq` + `Hash`: reaction and children tables key by state
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states must be serializable so the
///   transition history can be exported
///
/// # Example
///
/// ```rust
/// use flowstate::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum SwitchState {
///     Off,
///     On,
/// }
///
/// impl State for SwitchState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::On => "On",
///         }
///     }
/// }
///
/// assert_eq!(SwitchState::Off.name(), "Off");
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Final states represent completion points where no further
    /// transitions are expected. The runtime itself never enforces
    /// this; it exists for callers that want to stop driving a machine.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
