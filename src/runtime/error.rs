//! Errors surfaced by the transition engine.

/// Errors a transition function may return.
///
/// Failures propagate straight to whoever called `forward`/`advance`;
/// the engine never retries and never commits a state on error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The transition function rejected the event.
    #[error("transition rejected: {0}")]
    Rejected(String),

    /// The event does not apply in the given state.
    ///
    /// Transition functions are encouraged to treat out-of-context
    /// events as no-ops (return the unchanged state), since a detached
    /// child hook may deliver an event after the machine has moved on.
    /// This variant exists for machines that prefer to be strict.
    #[error("event '{event}' does not apply in state '{state}'")]
    InvalidEvent { state: String, event: String },
}

impl TransitionError {
    /// Shorthand for [`TransitionError::Rejected`].
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Shorthand for [`TransitionError::InvalidEvent`].
    pub fn invalid_event(state: impl Into<String>, event: impl Into<String>) -> Self {
        Self::InvalidEvent {
            state: state.into(),
            event: event.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_formats_reason() {
        let err = TransitionError::rejected("queue is full");
        assert_eq!(err.to_string(), "transition rejected: queue is full");
    }

    #[test]
    fn invalid_event_names_state_and_event() {
        let err = TransitionError::invalid_event("Stopped", "Pause");
        assert_eq!(
            err.to_string(),
            "event 'Pause' does not apply in state 'Stopped'"
        );
    }
}
