//! Action-tag keyed table of command handlers.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::message::{Command, Message, Payload};
use crate::runtime::EventBus;

use super::handler::{AsyncFnHandler, CommandHandler, FnHandler};
use super::relay::ClientRelay;

/// Errors raised while registering or dispatching commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Command action tag must not be empty")]
    EmptyTag,

    #[error("A handler for command '{action}' is already registered")]
    DuplicateHandler { action: String },

    #[error("No handler registered for command '{action}'")]
    UnknownCommand { action: String },
}

impl RegistryError {
    /// Stable tag used in logs and events.
    pub fn error_type(&self) -> &'static str {
        match self {
            RegistryError::EmptyTag => "empty_tag",
            RegistryError::DuplicateHandler { .. } => "duplicate_handler",
            RegistryError::UnknownCommand { .. } => "unknown_command",
        }
    }
}

/// Maps command action tags to handlers.
///
/// Built before a session starts and frozen once handed to
/// [`Runtime::spawn`](crate::runtime::Runtime::spawn).
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("actions", &self.actions())
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `action`, replacing any existing handler.
    ///
    /// Returns `true` when a previous handler was replaced.
    pub fn register<H>(&mut self, action: impl Into<String>, handler: H) -> Result<bool, RegistryError>
    where
        H: CommandHandler + 'static,
    {
        let action = checked_tag(action.into())?;
        let replaced = self
            .handlers
            .insert(action.clone(), Arc::new(handler))
            .is_some();
        if replaced {
            tracing::warn!(command = %action, "Replacing existing command handler");
        }
        Ok(replaced)
    }

    /// Register `handler` for `action`, refusing to replace an existing one.
    pub fn try_register<H>(&mut self, action: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: CommandHandler + 'static,
    {
        let action = checked_tag(action.into())?;
        if self.handlers.contains_key(&action) {
            return Err(RegistryError::DuplicateHandler { action });
        }
        self.handlers.insert(action, Arc::new(handler));
        Ok(())
    }

    /// Register a synchronous closure.
    pub fn register_fn<F>(&mut self, action: impl Into<String>, handler: F) -> Result<bool, RegistryError>
    where
        F: Fn(Option<Payload>) -> Option<Message> + Send + Sync + 'static,
    {
        self.register(action, FnHandler::new(handler))
    }

    /// Register a closure returning a future.
    pub fn register_async<F, Fut>(
        &mut self,
        action: impl Into<String>,
        handler: F,
    ) -> Result<bool, RegistryError>
    where
        F: Fn(Option<Payload>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Message>> + Send + 'static,
    {
        self.register(action, AsyncFnHandler::new(handler))
    }

    /// Forward commands tagged `action` to the client listening on `bus`.
    pub fn relay_to_client(&mut self, action: impl Into<String>, bus: &EventBus) -> Result<bool, RegistryError> {
        let action = action.into();
        let relay = ClientRelay::new(action.clone(), bus.clone());
        self.register(action, relay)
    }

    /// Look up the handler for `action`.
    pub fn resolve(&self, action: &str) -> Result<Arc<dyn CommandHandler>, RegistryError> {
        self.handlers
            .get(action)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCommand {
                action: action.to_string(),
            })
    }

    /// Run the handler for `command` to completion.
    pub async fn dispatch(&self, command: Command) -> Result<Option<Message>, RegistryError> {
        let handler = self.resolve(&command.action)?;
        Ok(handler.execute(command.payload).await)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    /// Registered action tags, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn checked_tag(action: String) -> Result<String, RegistryError> {
    if action.trim().is_empty() {
        return Err(RegistryError::EmptyTag);
    }
    Ok(action)
}
