use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::message::{Command, Message};
use crate::mvi::{apply, Reducer};
use crate::view::{Node, View};

/// Outcome of one accepted message.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub revision: u64,
    pub view: Node,
    pub command: Option<Command>,
}

/// Single owner of a session's current state.
///
/// `step` either commits a complete new state or leaves the previous one in
/// place; there is no partially applied transition.
pub struct Session<R: Reducer, V> {
    reducer: R,
    view: V,
    state: Arc<R::State>,
    revision: u64,
    startup: Option<Command>,
}

impl<R, V> Session<R, V>
where
    R: Reducer,
    V: View<R::State>,
{
    pub fn new(reducer: R, view: V, initial: R::State) -> Self {
        Self {
            reducer,
            view,
            state: Arc::new(initial),
            revision: 0,
            startup: None,
        }
    }

    /// Command dispatched once when the session starts, before any message
    /// is admitted.
    pub fn with_startup_command(mut self, command: Command) -> Self {
        self.startup = Some(command);
        self
    }

    pub(crate) fn take_startup_command(&mut self) -> Option<Command> {
        self.startup.take()
    }

    pub fn state(&self) -> &Arc<R::State> {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Project the current state. A panicking view is reported, not propagated.
    pub fn project(&self) -> Result<Node, RuntimeError> {
        self.render(&self.state)
            .map_err(|reason| RuntimeError::ProjectionFailed { reason })
    }

    fn render(&self, state: &R::State) -> Result<Node, String> {
        let view = &self.view;
        panic::catch_unwind(AssertUnwindSafe(|| view.view(state)))
            .map_err(|payload| panic_reason("view", payload))
    }

    /// Apply one message.
    ///
    /// Malformed messages never reach the reducer. The new state is projected
    /// before it is committed, so a reducer error or a panic in either the
    /// reducer or the view keeps the previous state and revision.
    pub fn step(&mut self, message: &Message) -> Result<Step, RuntimeError> {
        message.validate()?;

        let state = self.state.as_ref();
        let reducer = &self.reducer;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| apply(reducer, message, state)));

        let transition = match outcome {
            Ok(Ok(transition)) => transition,
            Ok(Err(err)) => return Err(transition_failed(message, err.to_string())),
            Err(payload) => {
                return Err(transition_failed(message, panic_reason("reducer", payload)))
            }
        };

        let view = self
            .render(&transition.state)
            .map_err(|reason| transition_failed(message, reason))?;

        self.state = Arc::new(transition.state);
        self.revision += 1;

        Ok(Step {
            revision: self.revision,
            view,
            command: transition.command,
        })
    }
}

fn transition_failed(message: &Message, reason: String) -> RuntimeError {
    RuntimeError::TransitionFailed {
        message: Box::new(message.clone()),
        reason,
    }
}

fn panic_reason(stage: &str, payload: Box<dyn Any + Send>) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        format!("{} panicked: {}", stage, reason)
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        format!("{} panicked: {}", stage, reason)
    } else {
        format!("{} panicked", stage)
    }
}
