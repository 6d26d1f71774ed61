use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::apps;
use crate::config::{AppKind, RuntimeConfig, SessionsConfig};
use crate::runtime::SessionPort;

use super::error::ApiError;
use super::shutdown::ShutdownManager;

/// When a session was last used and how many event streams follow it.
struct Activity {
    last_active: Mutex<Instant>,
    watchers: AtomicUsize,
}

impl Activity {
    fn new() -> Self {
        Self {
            last_active: Mutex::new(Instant::now()),
            watchers: AtomicUsize::new(0),
        }
    }

    fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        self.watchers.load(Ordering::SeqCst) == 0
            && now.saturating_duration_since(*self.last_active.lock()) >= idle_timeout
    }
}

struct SessionEntry {
    port: Arc<dyn SessionPort>,
    activity: Arc<Activity>,
}

/// Keeps a session from being swept while an event stream follows it.
///
/// Holds only the activity record, not the session, so closing the session
/// still ends the stream.
pub struct WatchGuard {
    activity: Arc<Activity>,
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.activity.watchers.fetch_sub(1, Ordering::SeqCst);
        self.activity.touch();
    }
}

/// Table of live sessions, one per connected client.
///
/// Removing an entry drops the table's handle; the session task stops once
/// no request still holds a clone of it. Sessions nobody has used for
/// `idle_timeout` are removed by [`sweep`](Self::sweep).
pub struct SessionManager {
    app: AppKind,
    runtime: RuntimeConfig,
    max_sessions: usize,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionManager {
    pub fn new(app: AppKind, runtime: RuntimeConfig, limits: &SessionsConfig) -> Self {
        Self {
            app,
            runtime,
            max_sessions: limits.max_sessions,
            idle_timeout: limits.idle_timeout(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn app(&self) -> AppKind {
        self.app
    }

    /// Spawn a fresh session of the configured app.
    pub fn create(&self) -> Result<(Uuid, Arc<dyn SessionPort>), ApiError> {
        let mut sessions = self.sessions.write();
        if sessions.len() >= self.max_sessions {
            return Err(ApiError::SessionLimit {
                max: self.max_sessions,
            });
        }

        let port = apps::spawn(self.app, &self.runtime)?;
        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionEntry {
                port: port.clone(),
                activity: Arc::new(Activity::new()),
            },
        );
        tracing::info!(session = %id, app = self.app.name(), "Session created");
        Ok((id, port))
    }

    /// Look up a session and mark it as used.
    pub fn get(&self, id: Uuid) -> Result<Arc<dyn SessionPort>, ApiError> {
        let sessions = self.sessions.read();
        let entry = sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
        entry.activity.touch();
        Ok(entry.port.clone())
    }

    /// Like [`get`](Self::get), plus a guard that keeps the session out of
    /// sweeps until it is dropped.
    pub fn watch(&self, id: Uuid) -> Result<(Arc<dyn SessionPort>, WatchGuard), ApiError> {
        let sessions = self.sessions.read();
        let entry = sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
        entry.activity.watchers.fetch_add(1, Ordering::SeqCst);
        entry.activity.touch();
        let guard = WatchGuard {
            activity: entry.activity.clone(),
        };
        Ok((entry.port.clone(), guard))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        match self.sessions.write().remove(&id) {
            Some(_) => {
                tracing::info!(session = %id, "Session closed");
                Ok(())
            }
            None => Err(ApiError::SessionNotFound(id)),
        }
    }

    /// Remove every session that has been idle for `idle_timeout` as of
    /// `now`. Returns how many were removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let idle = entry.activity.is_idle(now, self.idle_timeout);
            if idle {
                tracing::info!(session = %id, "Session evicted after idle timeout");
            }
            !idle
        });
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::debug!(
                removed = removed,
                remaining = sessions.len(),
                "Swept idle sessions"
            );
        }
        removed
    }

    /// Evict idle sessions every `every` until shutdown is signaled.
    pub async fn sweep(self: Arc<Self>, every: Duration, shutdown: Arc<ShutdownManager>) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.evict_idle(Instant::now());
                }
                _ = shutdown.signaled() => break,
            }
        }
        tracing::debug!("Session sweeper stopped");
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_sessions: usize) -> SessionsConfig {
        SessionsConfig {
            max_sessions,
            ..SessionsConfig::default()
        }
    }

    fn manager(max_sessions: usize) -> SessionManager {
        SessionManager::new(AppKind::Hello, RuntimeConfig::default(), &limits(max_sessions))
    }

    fn after_timeout() -> Instant {
        Instant::now() + SessionsConfig::default().idle_timeout() + Duration::from_secs(1)
    }

    #[tokio::test]
    async fn create_get_remove() {
        let manager = manager(4);
        assert!(manager.is_empty());

        let (id, _) = manager.create().unwrap();
        assert_eq!(manager.len(), 1);
        assert!(manager.get(id).is_ok());

        manager.remove(id).unwrap();
        assert!(matches!(manager.get(id), Err(ApiError::SessionNotFound(_))));
        assert!(matches!(manager.remove(id), Err(ApiError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn limit_is_enforced() {
        let manager = manager(1);
        manager.create().unwrap();
        assert!(matches!(
            manager.create(),
            Err(ApiError::SessionLimit { max: 1 })
        ));
    }

    #[tokio::test]
    async fn abandoned_sessions_free_their_slot() {
        let manager = manager(1);
        let (id, _) = manager.create().unwrap();
        assert!(matches!(manager.create(), Err(ApiError::SessionLimit { .. })));

        assert_eq!(manager.evict_idle(Instant::now()), 0);
        assert_eq!(manager.evict_idle(after_timeout()), 1);
        assert!(matches!(manager.get(id), Err(ApiError::SessionNotFound(_))));
        assert!(manager.create().is_ok());
    }

    #[tokio::test]
    async fn watched_sessions_are_not_evicted() {
        let manager = manager(4);
        let (id, _) = manager.create().unwrap();
        let (_port, guard) = manager.watch(id).unwrap();

        assert_eq!(manager.evict_idle(after_timeout()), 0);
        assert!(manager.get(id).is_ok());

        drop(guard);
        assert_eq!(manager.evict_idle(after_timeout()), 1);
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn sweeper_runs_until_shutdown() {
        let config = SessionsConfig {
            idle_timeout_seconds: 1,
            ..SessionsConfig::default()
        };
        let manager = Arc::new(SessionManager::new(
            AppKind::Hello,
            RuntimeConfig::default(),
            &config,
        ));
        manager.create().unwrap();

        let shutdown = Arc::new(ShutdownManager::new());
        let sweeper = tokio::spawn(
            manager
                .clone()
                .sweep(Duration::from_millis(50), shutdown.clone()),
        );

        tokio::time::timeout(Duration::from_secs(3), async {
            while !manager.is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("idle session was never swept");

        shutdown.signal_shutdown();
        tokio::time::timeout(Duration::from_secs(1), sweeper)
            .await
            .unwrap()
            .unwrap();
    }
}
