//! HTTP transport for runtime sessions.
//!
//! Each client opens its own session, posts messages to it and follows its
//! event stream. The transport never touches application state directly;
//! everything goes through the session's [`SessionPort`](crate::runtime::SessionPort).

mod error;
mod router;
mod sessions;
mod shutdown;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::Config;

pub use error::ApiError;
pub use router::{build_router, ServerState};
pub use sessions::{SessionManager, WatchGuard};
pub use shutdown::ShutdownManager;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid bind address '{addr}': {reason}")]
    InvalidBindAddress { addr: String, reason: String },

    #[error("Could not find available port in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },

    #[error("try_bind() must be called before run()")]
    NotBound,

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AppServer {
    pub addr: SocketAddr,
    /// Populated by try_bind(), consumed by run().
    listener: Option<TcpListener>,
    sessions: Arc<SessionManager>,
    shutdown: Arc<ShutdownManager>,
    port_search: u16,
    grace: Duration,
    sweep_interval: Duration,
}

impl AppServer {
    pub fn new(config: &Config) -> Self {
        let sessions = SessionManager::new(config.app, config.runtime.clone(), &config.sessions);
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            listener: None,
            sessions: Arc::new(sessions),
            shutdown: Arc::new(ShutdownManager::new()),
            port_search: config.server.port_search,
            grace: Duration::from_secs(config.server.shutdown_grace_seconds),
            sweep_interval: config.sessions.sweep_interval(),
        }
    }

    /// Bind to `bind_addr`. With a non-zero `port_search`, successive ports
    /// are tried while the requested one is busy.
    ///
    /// The listener is kept until run() so the port cannot be claimed by
    /// another process in between.
    pub async fn try_bind(&mut self, bind_addr: &str) -> Result<SocketAddr, ServerError> {
        let requested: SocketAddr =
            bind_addr
                .parse()
                .map_err(|e: std::net::AddrParseError| ServerError::InvalidBindAddress {
                    addr: bind_addr.to_string(),
                    reason: e.to_string(),
                })?;

        let start = requested.port();
        let end = start.saturating_add(self.port_search);
        for port in start..=end {
            let candidate = SocketAddr::new(requested.ip(), port);
            match TcpListener::bind(candidate).await {
                Ok(listener) => {
                    let actual = listener.local_addr()?;
                    self.addr = actual;
                    self.listener = Some(listener);
                    tracing::info!("Server bound to {}", actual);
                    return Ok(actual);
                }
                Err(e) => {
                    tracing::debug!("Port {} busy: {}", port, e);
                }
            }
        }

        Err(ServerError::NoAvailablePort { start, end })
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        self.sessions.clone()
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Serve until shutdown is signaled, then let open connections drain
    /// for at most the configured grace period.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = self.listener.ok_or(ServerError::NotBound)?;
        tracing::info!(app = self.sessions.app().name(), "Starting server on {}", self.addr);

        let app = build_router(ServerState {
            sessions: self.sessions.clone(),
            shutdown: self.shutdown.clone(),
        });

        let sweeper = tokio::spawn(
            self.sessions
                .clone()
                .sweep(self.sweep_interval, self.shutdown.clone()),
        );

        let shutdown = self.shutdown.clone();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(err) = shutdown.wait_for_shutdown().await {
                    tracing::error!("Failed to listen for OS signals: {}", err);
                    shutdown.signaled().await;
                }
            })
            .into_future();

        tokio::select! {
            result = server => result?,
            _ = self.shutdown.grace_expired(self.grace) => {
                tracing::warn!(grace = ?self.grace, "Forced shutdown after grace period");
            }
        }

        sweeper.abort();
        tracing::info!("Shutdown complete");
        Ok(())
    }
}

/// Cloneable trigger for stopping a running [`AppServer`].
#[derive(Clone)]
pub struct ServerHandle {
    shutdown: Arc<ShutdownManager>,
}

impl ServerHandle {
    pub fn shutdown(&self) {
        self.shutdown.signal_shutdown();
    }
}
