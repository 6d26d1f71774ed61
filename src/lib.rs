//! Update/render/command runtime with pluggable side-effect handlers.
//!
//! Applications supply a pure [`mvi::Reducer`] and a [`view::View`]; the
//! [`runtime`] serializes messages through them and hands the commands they
//! emit to an [`executor::CommandRegistry`]. The [`server`] module exposes
//! sessions over HTTP, and [`apps`] holds the bundled demos.

pub mod apps;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod message;
pub mod mvi;
pub mod runtime;
pub mod server;
pub mod view;
