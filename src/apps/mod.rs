//! Demo applications built on the runtime.
//!
//! Each app contributes a reducer, a view and the command handlers its
//! reducer relies on. [`spawn`] wires one of them into a running session.

pub mod blackjack;
pub mod clock;
pub mod cube;
pub mod hello;

use std::sync::Arc;

use crate::config::{AppKind, RuntimeConfig};
use crate::error::ReduceError;
use crate::executor::{CommandRegistry, RegistryError};
use crate::message::Message;
use crate::runtime::{EventBus, Runtime, Session, SessionPort};

/// The message value rendered as text. Missing values are a fault.
pub(crate) fn text_value(message: &Message) -> Result<String, ReduceError> {
    message
        .value
        .as_ref()
        .map(ToString::to_string)
        .ok_or_else(|| ReduceError::MissingValue {
            action: message.action.clone(),
        })
}

/// Start a fresh session of `kind`.
///
/// Must be called from within a tokio runtime.
pub fn spawn(kind: AppKind, config: &RuntimeConfig) -> Result<Arc<dyn SessionPort>, RegistryError> {
    let bus = EventBus::new(config.event_capacity);
    let port: Arc<dyn SessionPort> = match kind {
        AppKind::Hello => {
            let session = Session::new(hello::Hello, hello::Hello, hello::HelloState::default());
            Arc::new(Runtime::spawn(session, CommandRegistry::new(), bus, config))
        }
        AppKind::Clock => {
            let registry = clock::registry(&bus)?;
            let session = Session::new(clock::Clock, clock::Clock, clock::ClockState::default());
            Arc::new(Runtime::spawn(session, registry, bus, config))
        }
        AppKind::Blackjack => {
            let registry = blackjack::registry()?;
            let (state, shuffle) = blackjack::initial();
            let session = Session::new(blackjack::Blackjack, blackjack::Blackjack, state)
                .with_startup_command(shuffle);
            Arc::new(Runtime::spawn(session, registry, bus, config))
        }
        AppKind::Cube => {
            let registry = cube::registry(&bus)?;
            let session = Session::new(cube::Cube, cube::Cube, cube::CubeState::default());
            Arc::new(Runtime::spawn(session, registry, bus, config))
        }
    };
    tracing::debug!(app = kind.name(), "Session spawned");
    Ok(port)
}
