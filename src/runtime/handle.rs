use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::error::RuntimeError;
use crate::message::Message;
use crate::mvi::AppState;

use super::events::{EventBus, RuntimeEvent};
use super::types::{RenderOutput, RuntimeRequest, Snapshot};

/// Cloneable client of a running session.
pub struct RuntimeHandle<S> {
    sender: mpsc::Sender<RuntimeRequest<S>>,
    bus: EventBus,
    timeout: Duration,
}

impl<S> Clone for RuntimeHandle<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            bus: self.bus.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: AppState> RuntimeHandle<S> {
    pub(crate) fn new(
        sender: mpsc::Sender<RuntimeRequest<S>>,
        bus: EventBus,
        timeout: Duration,
    ) -> Self {
        Self {
            sender,
            bus,
            timeout,
        }
    }

    /// Queue `message` and wait for its transition result.
    ///
    /// On `Timeout` the message stays queued and may still be applied.
    pub async fn submit(&self, message: Message) -> Result<RenderOutput, RuntimeError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(RuntimeRequest::Submit {
                message,
                respond_to,
            })
            .await
            .map_err(|_| RuntimeError::Disconnected)?;

        recv_with_timeout(receiver, self.timeout).await?
    }

    /// Project the current state without applying anything.
    pub async fn render(&self) -> Result<RenderOutput, RuntimeError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(RuntimeRequest::Render { respond_to })
            .await
            .map_err(|_| RuntimeError::Disconnected)?;

        recv_with_timeout(receiver, self.timeout).await?
    }

    /// Current committed state, in queue order with other requests.
    pub async fn snapshot(&self) -> Result<Snapshot<S>, RuntimeError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(RuntimeRequest::Snapshot { respond_to })
            .await
            .map_err(|_| RuntimeError::Disconnected)?;

        recv_with_timeout(receiver, self.timeout).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.bus.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// State-type-erased view of a session, used by the transport.
#[async_trait]
pub trait SessionPort: Send + Sync {
    async fn submit(&self, message: Message) -> Result<RenderOutput, RuntimeError>;

    async fn render(&self) -> Result<RenderOutput, RuntimeError>;

    fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent>;
}

#[async_trait]
impl<S: AppState> SessionPort for RuntimeHandle<S> {
    async fn submit(&self, message: Message) -> Result<RenderOutput, RuntimeError> {
        RuntimeHandle::submit(self, message).await
    }

    async fn render(&self) -> Result<RenderOutput, RuntimeError> {
        RuntimeHandle::render(self).await
    }

    fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        RuntimeHandle::subscribe(self)
    }
}

async fn recv_with_timeout<T>(
    receiver: oneshot::Receiver<T>,
    timeout: Duration,
) -> Result<T, RuntimeError> {
    match tokio::time::timeout(timeout, receiver).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(RuntimeError::Disconnected),
        Err(_) => Err(RuntimeError::Timeout(timeout)),
    }
}
