use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::executor::{CommandHandler, CommandRegistry};
use crate::message::{Command, Message};
use crate::mvi::Reducer;
use crate::view::View;

use super::events::{EventBus, RuntimeEvent};
use super::handle::RuntimeHandle;
use super::session::Session;
use super::types::{CommandStatus, RenderOutput, RuntimeRequest, Snapshot};

/// Entry point for starting session actors.
pub struct Runtime;

impl Runtime {
    /// Move `session` into its own task and return a handle to it.
    ///
    /// The registry becomes read-only configuration of this session. The
    /// task stops once every handle has been dropped and no command handler
    /// is about to deliver a follow-up.
    pub fn spawn<R, V>(
        session: Session<R, V>,
        registry: CommandRegistry,
        bus: EventBus,
        config: &RuntimeConfig,
    ) -> RuntimeHandle<R::State>
    where
        R: Reducer,
        V: View<R::State>,
    {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let server = RuntimeServer {
            session,
            registry: Arc::new(registry),
            bus: bus.clone(),
            receiver,
            follow_ups: sender.downgrade(),
        };
        tokio::spawn(server.run());
        RuntimeHandle::new(sender, bus, config.submit_timeout())
    }
}

enum Resolved {
    Ready {
        handler: Arc<dyn CommandHandler>,
        command: Command,
    },
    Unknown {
        action: String,
    },
}

impl Resolved {
    fn status(&self) -> CommandStatus {
        match self {
            Resolved::Ready { command, .. } => CommandStatus::Dispatched {
                action: command.action.clone(),
            },
            Resolved::Unknown { action } => CommandStatus::Unknown {
                action: action.clone(),
            },
        }
    }
}

struct RuntimeServer<R: Reducer, V> {
    session: Session<R, V>,
    registry: Arc<CommandRegistry>,
    bus: EventBus,
    receiver: mpsc::Receiver<RuntimeRequest<R::State>>,
    follow_ups: mpsc::WeakSender<RuntimeRequest<R::State>>,
}

impl<R, V> RuntimeServer<R, V>
where
    R: Reducer,
    V: View<R::State>,
{
    async fn run(mut self) {
        if let Some(command) = self.session.take_startup_command() {
            tracing::debug!(command = %command.action, "Dispatching startup command");
            let resolved = self.resolve(command);
            self.execute(resolved);
        }

        while let Some(request) = self.receiver.recv().await {
            match request {
                RuntimeRequest::Submit {
                    message,
                    respond_to,
                } => {
                    let result = self.apply(message);
                    if respond_to.send(result).is_err() {
                        tracing::trace!("Runtime: Submit response dropped (caller gone)");
                    }
                }
                RuntimeRequest::FollowUp { message, origin } => {
                    tracing::debug!(
                        origin = %origin,
                        action = %message.action,
                        "Applying follow-up message"
                    );
                    // Failures are logged and published by apply; nobody awaits this one.
                    let _ = self.apply(message);
                }
                RuntimeRequest::Render { respond_to } => {
                    let output = self.session.project().map(|view| RenderOutput {
                        revision: self.session.revision(),
                        view,
                        command: None,
                    });
                    if let Err(err) = &output {
                        tracing::error!(error_type = err.error_type(), "Render failed: {}", err);
                    }
                    if respond_to.send(output).is_err() {
                        tracing::trace!("Runtime: Render response dropped (caller gone)");
                    }
                }
                RuntimeRequest::Snapshot { respond_to } => {
                    let snapshot = Snapshot {
                        revision: self.session.revision(),
                        state: self.session.state().clone(),
                    };
                    if respond_to.send(snapshot).is_err() {
                        tracing::trace!("Runtime: Snapshot response dropped (caller gone)");
                    }
                }
            }
        }

        tracing::debug!(revision = self.session.revision(), "Runtime session stopped");
    }

    fn apply(&mut self, message: Message) -> Result<RenderOutput, RuntimeError> {
        match self.session.step(&message) {
            Ok(step) => {
                let resolved = step.command.map(|command| self.resolve(command));
                let output = RenderOutput {
                    revision: step.revision,
                    view: step.view,
                    command: resolved.as_ref().map(Resolved::status),
                };
                tracing::debug!(
                    action = %message.action,
                    revision = output.revision,
                    "Transition committed"
                );

                // The view goes out before the handler starts, so a follow-up
                // can never be observed ahead of the transition that caused it.
                self.bus.publish(RuntimeEvent::Rendered(output.clone()));
                if let Some(resolved) = resolved {
                    self.execute(resolved);
                }
                Ok(output)
            }
            Err(err) => {
                tracing::warn!(
                    action = %message.action,
                    error_type = err.error_type(),
                    "Message rejected: {}",
                    err
                );
                self.bus.publish(RuntimeEvent::Failed {
                    error_type: err.error_type().to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn resolve(&self, command: Command) -> Resolved {
        match self.registry.resolve(&command.action) {
            Ok(handler) => Resolved::Ready { handler, command },
            Err(err) => {
                tracing::warn!(command = %command.action, "{}", err);
                self.bus.publish(RuntimeEvent::Failed {
                    error_type: err.error_type().to_string(),
                    message: err.to_string(),
                });
                Resolved::Unknown {
                    action: command.action,
                }
            }
        }
    }

    /// Run the handler off the actor task; its follow-up re-enters through
    /// the admission queue like any external message.
    fn execute(&self, resolved: Resolved) {
        let Resolved::Ready { handler, command } = resolved else {
            return;
        };
        let follow_ups = self.follow_ups.clone();

        tokio::spawn(async move {
            let Command { action, payload } = command;
            let Some(message) = handler.execute(payload).await else {
                tracing::trace!(command = %action, "Command finished without follow-up");
                return;
            };
            let Some(sender) = follow_ups.upgrade() else {
                tracing::debug!(command = %action, "Session closed, dropping follow-up");
                return;
            };
            let request = RuntimeRequest::FollowUp {
                message,
                origin: action.clone(),
            };
            if sender.send(request).await.is_err() {
                tracing::debug!(command = %action, "Session closed, dropping follow-up");
            }
        });
    }
}
