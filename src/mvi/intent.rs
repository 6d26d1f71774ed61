//! Decoding of open wire messages into closed intents.

use crate::error::ReduceError;
use crate::message::Message;

/// An application's closed set of actions.
///
/// Intents represent:
/// - User actions (button clicks, input changes)
/// - Effect results fed back by command handlers
///
/// `Ok(None)` means the action is not one this application knows about;
/// the runtime treats that as a legal no-op, not an error.
pub trait Intent: Sized + Send + 'static {
    fn from_message(message: &Message) -> Result<Option<Self>, ReduceError>;
}
