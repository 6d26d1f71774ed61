use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Demo application served by this process.
    #[serde(default)]
    pub app: AppKind,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The demo applications bundled with the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    #[default]
    Hello,
    Clock,
    Blackjack,
    Cube,
}

impl AppKind {
    pub fn name(self) -> &'static str {
        match self {
            AppKind::Hello => "hello",
            AppKind::Clock => "clock",
            AppKind::Blackjack => "blackjack",
            AppKind::Cube => "cube",
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// How many successive ports to try when the configured one is busy.
    /// 0 (the default) binds the configured port or fails.
    #[serde(default = "default_port_search")]
    pub port_search: u16,
    /// How long open connections may keep draining after shutdown is
    /// signaled before the server stops anyway, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

/// Per-session runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Capacity of the serialized admission queue (default: 64).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Capacity of the per-session event broadcast (default: 128).
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// How long a caller waits for its transition result (default: 5000).
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
}

impl RuntimeConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }
}

/// Session table limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Maximum number of concurrently open sessions (default: 256).
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Sessions untouched for this long are closed (default: 1800).
    /// A session with an open event stream is never idle.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// How often idle sessions are swept (default: 60).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl SessionsConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// Log output settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_port_search() -> u16 {
    0
}

fn default_shutdown_grace() -> u64 {
    10
}

fn default_queue_capacity() -> usize {
    64
}

fn default_event_capacity() -> usize {
    128
}

fn default_submit_timeout_ms() -> u64 {
    5000
}

fn default_max_sessions() -> usize {
    256
}

fn default_idle_timeout() -> u64 {
    1800
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port_search: default_port_search(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            event_capacity: default_event_capacity(),
            submit_timeout_ms: default_submit_timeout_ms(),
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_seconds: default_idle_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
