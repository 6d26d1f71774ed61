//! Core trait for command handlers.

use std::future::Future;

use async_trait::async_trait;

use crate::message::{Message, Payload};

/// Performs the effect behind one command action tag.
///
/// Handlers run outside the session's critical section, so they may take as
/// long as they need. A handler that never finishes simply never produces a
/// follow-up.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Execute the effect for a command carrying `payload`.
    ///
    /// # Returns
    /// * `Some(message)` - follow-up message to apply to the session
    /// * `None` - the effect needs no answer
    async fn execute(&self, payload: Option<Payload>) -> Option<Message>;
}

/// Adapter for synchronous closures.
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn(Option<Payload>) -> Option<Message> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self(handler)
    }
}

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(Option<Payload>) -> Option<Message> + Send + Sync,
{
    async fn execute(&self, payload: Option<Payload>) -> Option<Message> {
        (self.0)(payload)
    }
}

/// Adapter for closures returning a future.
pub struct AsyncFnHandler<F>(F);

impl<F, Fut> AsyncFnHandler<F>
where
    F: Fn(Option<Payload>) -> Fut + Send + Sync,
    Fut: Future<Output = Option<Message>> + Send + 'static,
{
    pub fn new(handler: F) -> Self {
        Self(handler)
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for AsyncFnHandler<F>
where
    F: Fn(Option<Payload>) -> Fut + Send + Sync,
    Fut: Future<Output = Option<Message>> + Send + 'static,
{
    async fn execute(&self, payload: Option<Payload>) -> Option<Message> {
        (self.0)(payload).await
    }
}
