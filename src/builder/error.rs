//! Errors from state machine construction.

/// Errors that can occur when building a machine definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// No transition function was provided.
    #[error("machine definition requires a transition function")]
    MissingTransition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_transition_message() {
        assert_eq!(
            BuildError::MissingTransition.to_string(),
            "machine definition requires a transition function"
        );
    }
}
