//! Command Executor Registry.
//!
//! Commands are the only way effects leave the pure core. Each command
//! action tag maps to one [`CommandHandler`]; the handler may answer with a
//! follow-up message that the runtime feeds back through its admission queue.

mod handler;
mod registry;
mod relay;

pub use handler::{AsyncFnHandler, CommandHandler, FnHandler};
pub use registry::{CommandRegistry, RegistryError};
pub use relay::ClientRelay;
