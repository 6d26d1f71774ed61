mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{AppKind, Config, LoggingConfig, RuntimeConfig, ServerConfig, SessionsConfig};
