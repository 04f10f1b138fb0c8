//! REST Blueprint API server.
//!
//! # Architecture
//!
//! - Axum router with request ID and access log middleware
//! - Feature handlers over narrow repository traits
//! - `PostgreSQL` via a shared `sqlx` pool
//! - Sentry error tracking when a DSN is configured
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p rest-blueprint-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use rest_blueprint_api::{
    AppState,
    config::AppConfig,
    db,
    error::StartupError,
    router, telemetry,
};

#[tokio::main]
async fn main() {
    // Configuration is needed before logging exists, so failures go to stderr.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{}", StartupError::from(err));
            }
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(&config.log);

    if let Some(path) = &config.missing_file {
        tracing::warn!(path = %path, "Config file not found, using environment and defaults");
    }

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "Startup failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!(
        app = %config.app.name,
        mode = %config.app.mode,
        version = %config.app.version,
        level = %config.log.level_filter(),
        "Starting service"
    );

    let pool = db::create_pool(&config.db).await?;
    tracing::info!("Database pool created");

    let addr = config.socket_addr();
    let state = AppState::new(config, pool);

    let app = router(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(StartupError::Bind)?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(StartupError::Serve)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
