//! State transition history tracking.
//!
//! An immutable, in-memory log of the transitions a machine has taken.
//! The stateful wrapper records into it on every successful advance;
//! nothing in the runtime ever reads it back.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state transition.
///
/// Records are immutable values representing a move from one state to
/// another at a specific point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

impl<S: State> TransitionRecord<S> {
    /// Create a record stamped with the current time.
    pub fn new(from: S, to: S) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered history of state transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition appended rather than mutating in place.
///
/// # Example
///
/// ```rust
/// use flowstate::core::{State, StateHistory, TransitionRecord};
/// use flowstate::state_enum;
///
/// state_enum! {
///     enum Phase {
///         Start,
///         Middle,
///         End,
///     }
///     final: [End]
/// }
///
/// let history = StateHistory::new()
///     .record(TransitionRecord::new(Phase::Start, Phase::Middle))
///     .record(TransitionRecord::new(Phase::Middle, Phase::End));
///
/// let path = history.path();
/// assert_eq!(path, vec![&Phase::Start, &Phase::Middle, &Phase::End]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    records: Vec<TransitionRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, record: TransitionRecord<S>) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the first record's `from`
    /// state, then the `to` state of every record.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` when the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all records in order.
    pub fn records(&self) -> &[TransitionRecord<S>] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum TestState {
            Initial,
            Processing,
            Complete,
        }
        final: [Complete]
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState> = StateHistory::new();
        assert_eq!(history.records().len(), 0);
        assert!(history.path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();

        let new_history = history.record(TransitionRecord::new(
            TestState::Initial,
            TestState::Processing,
        ));

        assert_eq!(history.records().len(), 0);
        assert_eq!(new_history.records().len(), 1);
    }

    #[test]
    fn path_returns_state_sequence() {
        let history = StateHistory::new()
            .record(TransitionRecord::new(
                TestState::Initial,
                TestState::Processing,
            ))
            .record(TransitionRecord::new(
                TestState::Processing,
                TestState::Complete,
            ));

        let path = history.path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &TestState::Initial);
        assert_eq!(path[1], &TestState::Processing);
        assert_eq!(path[2], &TestState::Complete);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let history =
            StateHistory::new().record(TransitionRecord::new(
                TestState::Initial,
                TestState::Processing,
            ));

        std::thread::sleep(Duration::from_millis(10));

        let history = history.record(TransitionRecord::new(
            TestState::Processing,
            TestState::Complete,
        ));

        let duration = history.duration();
        assert!(duration.is_some());
        assert!(duration.unwrap() >= Duration::from_millis(10));
    }

    #[test]
    fn single_record_has_duration_zero() {
        let record = TransitionRecord::new(TestState::Initial, TestState::Processing);
        let history = StateHistory::new().record(record);

        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(TransitionRecord::new(
            TestState::Initial,
            TestState::Processing,
        ));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState> = serde_json::from_str(&json).unwrap();

        assert_eq!(history.records().len(), deserialized.records().len());
    }
}
