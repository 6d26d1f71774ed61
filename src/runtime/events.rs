use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::message::Command;

use super::types::RenderOutput;

/// Things a session announces to whoever is listening (usually the client
/// connection's event stream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    /// A transition committed and its view was projected.
    Rendered(RenderOutput),
    /// A command meant for the client (e.g. a widget call or an alert).
    ClientCommand(Command),
    /// A transition or dispatch failed; the session keeps running.
    Failed { error_type: String, message: String },
}

impl RuntimeEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeEvent::Rendered(_) => "rendered",
            RuntimeEvent::ClientCommand(_) => "command",
            RuntimeEvent::Failed { .. } => "failed",
        }
    }
}

/// Per-session broadcast of [`RuntimeEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RuntimeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, event: RuntimeEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Runtime event dropped (no subscribers)");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(4);
        let mut receiver = bus.subscribe();
        bus.publish(RuntimeEvent::ClientCommand(Command::new("setColor")));
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.name(), "command");
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new(1);
        bus.publish(RuntimeEvent::Failed {
            error_type: "timeout".into(),
            message: "late".into(),
        });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = RuntimeEvent::ClientCommand(Command::new("showMessage"));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "client_command", "action": "showMessage"})
        );
    }
}
