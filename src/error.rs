//! Error taxonomy of the runtime core.
//!
//! Every variant here is recoverable at the session level: the runtime keeps
//! its previous state and stays usable after reporting it.

use std::time::Duration;

use thiserror::Error;

use crate::message::Message;

/// Errors surfaced by a session to its caller.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The message was rejected before reaching the reducer.
    #[error("Malformed message: {reason}")]
    MalformedMessage { reason: String },

    /// The reducer faulted; the previous state is retained.
    #[error("Transition failed for action '{}': {reason}", message.action)]
    TransitionFailed {
        message: Box<Message>,
        reason: String,
    },

    /// The view panicked while projecting the committed state.
    #[error("Projection failed: {reason}")]
    ProjectionFailed { reason: String },

    /// The session actor is gone.
    #[error("Runtime session has stopped")]
    Disconnected,

    /// The session actor did not answer in time.
    #[error("Runtime did not respond within {0:?}")]
    Timeout(Duration),
}

impl RuntimeError {
    /// Stable tag used in logs and JSON error bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            RuntimeError::MalformedMessage { .. } => "malformed_message",
            RuntimeError::TransitionFailed { .. } => "transition_failed",
            RuntimeError::ProjectionFailed { .. } => "projection_failed",
            RuntimeError::Disconnected => "disconnected",
            RuntimeError::Timeout(_) => "timeout",
        }
    }
}

/// Faults raised by application reducers while decoding or applying an intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    #[error("action '{action}' requires a value")]
    MissingValue { action: String },

    #[error("action '{action}' has an invalid value: {reason}")]
    InvalidValue { action: String, reason: String },

    #[error("action '{action}' is missing payload field '{field}'")]
    MissingField { action: String, field: String },

    #[error("{0}")]
    Rejected(String),
}

impl ReduceError {
    pub fn invalid(action: &str, reason: impl Into<String>) -> Self {
        ReduceError::InvalidValue {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_failed_names_the_action() {
        let err = RuntimeError::TransitionFailed {
            message: Box::new(Message::new("Hit")),
            reason: "deck is empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "Transition failed for action 'Hit': deck is empty"
        );
        assert_eq!(err.error_type(), "transition_failed");
    }

    #[test]
    fn error_types_are_distinct() {
        let tags = [
            RuntimeError::MalformedMessage { reason: String::new() }.error_type(),
            RuntimeError::ProjectionFailed { reason: String::new() }.error_type(),
            RuntimeError::Disconnected.error_type(),
            RuntimeError::Timeout(Duration::from_millis(1)).error_type(),
        ];
        assert_eq!(
            tags,
            ["malformed_message", "projection_failed", "disconnected", "timeout"]
        );
    }
}
