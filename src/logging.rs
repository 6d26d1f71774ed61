use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to replace log filter: {0}")]
    Reload(#[from] reload::Error),
}

/// Swaps the filter of the installed subscriber.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set and keeps precedence.
    pinned: bool,
}

impl LogHandle {
    /// Replace the active filter, unless `RUST_LOG` chose it.
    pub fn set_filter(&self, filter: &str) -> Result<(), LoggingError> {
        if self.pinned {
            tracing::debug!(filter, "RUST_LOG is set, ignoring configured filter");
            return Ok(());
        }

        let parsed = EnvFilter::try_new(filter).map_err(|source| LoggingError::InvalidFilter {
            filter: filter.to_string(),
            source,
        })?;
        self.filter.reload(parsed)?;
        tracing::debug!(filter, "Log filter applied");
        Ok(())
    }
}

fn build(
    default_filter: &str,
    env_filter: Option<EnvFilter>,
) -> (impl Subscriber + Send + Sync + 'static, LogHandle) {
    let pinned = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| EnvFilter::new(default_filter));
    let (filter, handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_timer(UtcTime::rfc_3339()),
    );

    (
        subscriber,
        LogHandle {
            filter: handle,
            pinned,
        },
    )
}

/// Install the global fmt subscriber.
///
/// Call this before anything else logs, with whatever filter is known at
/// that point; the returned handle applies the configured filter later.
/// `RUST_LOG` wins over both when set. Calling this twice is harmless; the
/// second call keeps the first subscriber.
pub fn init_tracing(default_filter: &str) -> LogHandle {
    let (subscriber, handle) = build(default_filter, EnvFilter::try_from_default_env().ok());

    if subscriber.try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    handle
}
