//! The Runtime Loop.
//!
//! A [`Session`] is the synchronous core: it owns the current state and
//! applies one message at a time. [`Runtime::spawn`] moves a session into a
//! tokio task fed by a bounded admission queue, so every transition of a
//! session is serialized no matter how many connections or command handlers
//! submit concurrently. Callers talk to the task through a cloneable
//! [`RuntimeHandle`].

mod actor;
mod events;
mod handle;
mod session;
mod types;

pub use actor::Runtime;
pub use events::{EventBus, RuntimeEvent};
pub use handle::{RuntimeHandle, SessionPort};
pub use session::{Session, Step};
pub use types::{CommandStatus, RenderOutput, Snapshot};
