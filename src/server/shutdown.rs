use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::signal;
use tokio::sync::Notify;

/// Shutdown flag shared by the server, its streams and background tasks.
pub struct ShutdownManager {
    shutdown: AtomicBool,
    notify: Notify,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Wait for ctrl-c, SIGTERM or [`signal_shutdown`](Self::signal_shutdown).
    pub async fn wait_for_shutdown(&self) -> std::io::Result<()> {
        if self.is_shutting_down() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
                _ = self.signaled() => {},
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = self.signaled() => {},
            }
        }

        self.signal_shutdown();
        tracing::info!("Shutting down gracefully...");
        Ok(())
    }

    /// Resolves once shutdown has been signaled, ignoring OS signals.
    pub async fn signaled(&self) {
        // Register before checking the flag so a concurrent signal is not lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }

    pub fn signal_shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Resolves `grace` after shutdown has been signaled.
    pub async fn grace_expired(&self, grace: Duration) {
        self.signaled().await;
        tokio::time::sleep(grace).await;
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
