//! Model-View-Intent (MVI) primitives for the runtime core.
//!
//! # Architecture
//!
//! ```text
//! Message ──→ Intent ──→ Reducer ──→ (State, Command?) ──→ View
//!    ↑                                      │
//!    └──────── CommandRegistry ←────────────┘
//! ```
//!
//! - **State**: immutable snapshot of application state
//! - **Intent**: closed, application-specific decoding of a [`Message`]
//! - **Reducer**: pure function `(State, Intent) -> Transition`
//!
//! [`Message`]: crate::message::Message

mod intent;
mod reducer;
mod state;
mod transition;

pub use intent::Intent;
pub use reducer::{apply, Reducer};
pub use state::AppState;
pub use transition::Transition;
