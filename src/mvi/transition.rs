//! Result of one reducer invocation.

use crate::message::Command;

/// The next state plus an optional effect request.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub state: S,
    pub command: Option<Command>,
}

impl<S> Transition<S> {
    /// Move to `state` without requesting any effect.
    pub fn next(state: S) -> Self {
        Self {
            state,
            command: None,
        }
    }

    /// Move to `state` and request `command`.
    pub fn with_command(state: S, command: Command) -> Self {
        Self {
            state,
            command: Some(command),
        }
    }
}

impl<S: Clone> Transition<S> {
    /// Keep the current state, no effect.
    pub fn unchanged(state: &S) -> Self {
        Self::next(state.clone())
    }
}
