//! Repository layer over the `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users` - Application users (soft-deleted via `deleted_at`)
//! - `customers` - Customer records (soft-deleted via `deleted_at`)
//!
//! Email is unique among rows where `deleted_at IS NULL`; see the partial
//! indexes in `crates/api/migrations/`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p rest-blueprint-cli -- migrate
//! ```
//!
//! # Implementations
//!
//! Every repository trait has a `PostgreSQL` implementation ([`users`],
//! [`customers`]) and an in-memory one ([`memory`]) that keeps the same
//! invariants for tests.

pub mod customers;
pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use rest_blueprint_core::{CustomerId, Email, UserId};

use crate::config::DbConfig;
use crate::context::RequestContext;
use crate::models::{Customer, NewCustomer, NewUser, User};

pub use customers::PgCustomerRepository;
pub use memory::InMemoryStore;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store did not answer within the per-call timeout.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The store cannot serve requests at all (poisoned lock, taken offline).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Map a write error, turning unique violations into `Conflict`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Shared user repository contract.
///
/// Lookups return `RepositoryError::NotFound` when no live row matches, so
/// callers can tell a missing user apart from a failed round trip.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All live users ordered by id.
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<User>, RepositoryError>;

    /// A live user by id.
    async fn get_by_id(&self, ctx: &RequestContext, id: UserId) -> Result<User, RepositoryError>;

    /// A live user by email.
    async fn get_by_email(
        &self,
        ctx: &RequestContext,
        email: &Email,
    ) -> Result<User, RepositoryError>;

    /// Insert a user. `Conflict` if the email is taken by a live user.
    async fn create(&self, ctx: &RequestContext, user: NewUser) -> Result<User, RepositoryError>;

    /// Overwrite name and email of a live user.
    async fn update(&self, ctx: &RequestContext, user: &User) -> Result<(), RepositoryError>;

    /// Soft-delete a live user.
    async fn delete(&self, ctx: &RequestContext, id: UserId) -> Result<(), RepositoryError>;
}

/// Shared customer repository contract.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// All live customers ordered by id.
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<Customer>, RepositoryError>;

    /// A live customer by id.
    async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: CustomerId,
    ) -> Result<Customer, RepositoryError>;

    /// A live customer by email.
    async fn get_by_email(
        &self,
        ctx: &RequestContext,
        email: &Email,
    ) -> Result<Customer, RepositoryError>;

    /// Live customers whose first name equals `first_name` exactly.
    async fn get_by_first_name(
        &self,
        ctx: &RequestContext,
        first_name: &str,
    ) -> Result<Vec<Customer>, RepositoryError>;

    /// Insert a customer. `Conflict` if the email is taken by a live customer.
    async fn create(
        &self,
        ctx: &RequestContext,
        customer: NewCustomer,
    ) -> Result<Customer, RepositoryError>;

    /// Overwrite the mutable fields of a live customer.
    async fn update(&self, ctx: &RequestContext, customer: &Customer)
    -> Result<(), RepositoryError>;

    /// Soft-delete a live customer.
    async fn delete(&self, ctx: &RequestContext, id: CustomerId) -> Result<(), RepositoryError>;
}

/// Store round trip used by the health check.
#[async_trait]
pub trait Liveness: Send + Sync {
    /// Run `SELECT 1` and return the value the store answered with.
    async fn round_trip(&self) -> Result<i32, RepositoryError>;
}

#[async_trait]
impl Liveness for PgPool {
    async fn round_trip(&self) -> Result<i32, RepositoryError> {
        Ok(sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self)
            .await?)
    }
}

/// Create a `PostgreSQL` connection pool and verify it with a ping.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established within the
/// configured connect timeout, or if the ping fails.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.connect_timeout())
        .connect(config.dsn.expose_secret())
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
        assert_eq!(
            RepositoryError::Conflict("email already exists".to_owned()).to_string(),
            "constraint violation: email already exists"
        );
        assert_eq!(
            RepositoryError::Timeout(Duration::from_secs(10)).to_string(),
            "store call timed out after 10s"
        );
    }

    #[test]
    fn test_from_write_keeps_non_constraint_errors() {
        let err = RepositoryError::from_write(sqlx::Error::PoolTimedOut, "email already exists");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
