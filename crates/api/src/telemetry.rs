//! Logging and error tracking setup.
//!
//! Both are initialised once from [`AppConfig`] at startup. `RUST_LOG`, when
//! set, replaces the configured level entirely.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, LogConfig};

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured.
#[must_use]
pub fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let environment = config
        .sentry
        .environment
        .clone()
        .unwrap_or_else(|| config.app.mode.clone());

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: Some(format!("{}@{}", config.app.name, config.app.version).into()),
            environment: Some(environment.into()),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Build the level filter: `RUST_LOG` if set, the configured level otherwise.
fn env_filter(log: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(log.level_filter().into()))
}

/// Install the global tracing subscriber.
///
/// `pretty_console` selects the human-readable formatter; otherwise events
/// are written as flattened JSON lines.
pub fn init_tracing(log: &LogConfig) {
    let json_layer = (!log.pretty_console)
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = log.pretty_console.then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter(log))
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_init_sentry_without_dsn_is_disabled() {
        let config = AppConfig::from_sources(None, "test", |_| None).unwrap();
        assert!(init_sentry(&config).is_none());
    }
}
