use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::RuntimeError;
use crate::message::Message;
use crate::view::Node;

/// What a caller gets back from an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Number of messages accepted so far, including this one.
    pub revision: u64,
    pub view: Node,
    /// Fate of the command emitted by this transition, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandStatus>,
}

/// How the runtime disposed of a transition's command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandStatus {
    /// A handler was found and started.
    Dispatched { action: String },
    /// No handler is registered; the state change still committed.
    Unknown { action: String },
}

/// A committed state together with its revision.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    pub revision: u64,
    pub state: Arc<S>,
}

pub(crate) enum RuntimeRequest<S> {
    Submit {
        message: Message,
        respond_to: oneshot::Sender<Result<RenderOutput, RuntimeError>>,
    },
    FollowUp {
        message: Message,
        origin: String,
    },
    Render {
        respond_to: oneshot::Sender<Result<RenderOutput, RuntimeError>>,
    },
    Snapshot {
        respond_to: oneshot::Sender<Snapshot<S>>,
    },
}
