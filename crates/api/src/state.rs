//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{
    CustomerRepository, InMemoryStore, Liveness, PgCustomerRepository, PgUserRepository,
    UserRepository,
};
use crate::response::Responder;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the shared
/// repositories that feature handlers compose.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    responder: Responder,
    users: Arc<dyn UserRepository>,
    customers: Arc<dyn CustomerRepository>,
    liveness: Arc<dyn Liveness>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        let customers = Arc::new(PgCustomerRepository::new(pool.clone()));
        Self::from_parts(config, users, customers, Arc::new(pool))
    }

    /// Create application state backed by a single in-memory store.
    #[must_use]
    pub fn in_memory(config: AppConfig, store: Arc<InMemoryStore>) -> Self {
        Self::from_parts(config, store.clone(), store.clone(), store)
    }

    /// Create application state from explicit repository implementations.
    #[must_use]
    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        customers: Arc<dyn CustomerRepository>,
        liveness: Arc<dyn Liveness>,
    ) -> Self {
        let responder = Responder::new(config.app.version.as_str());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                responder,
                users,
                customers,
                liveness,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Envelope builder stamped with the configured version.
    #[must_use]
    pub fn responder(&self) -> &Responder {
        &self.inner.responder
    }

    #[must_use]
    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.inner.users)
    }

    #[must_use]
    pub fn customers(&self) -> Arc<dyn CustomerRepository> {
        Arc::clone(&self.inner.customers)
    }

    #[must_use]
    pub fn liveness(&self) -> Arc<dyn Liveness> {
        Arc::clone(&self.inner.liveness)
    }
}
