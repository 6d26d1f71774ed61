use async_trait::async_trait;

use crate::message::{Command, Message, Payload};
use crate::runtime::{EventBus, RuntimeEvent};

use super::handler::CommandHandler;

/// Hands a command to the client over the session's event bus.
///
/// Used for effects that only the browser can perform (alerts, widget
/// calls). Produces no follow-up; if the client wants to answer, it submits
/// a new message.
pub struct ClientRelay {
    action: String,
    bus: EventBus,
}

impl ClientRelay {
    pub fn new(action: impl Into<String>, bus: EventBus) -> Self {
        Self {
            action: action.into(),
            bus,
        }
    }
}

#[async_trait]
impl CommandHandler for ClientRelay {
    async fn execute(&self, payload: Option<Payload>) -> Option<Message> {
        let command = Command {
            action: self.action.clone(),
            payload,
        };
        tracing::debug!(command = %command.action, "Relaying command to client");
        self.bus.publish(RuntimeEvent::ClientCommand(command));
        None
    }
}
