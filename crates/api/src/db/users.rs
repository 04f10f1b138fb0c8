//! User repository for `PostgreSQL`.
//!
//! Queries are built with `sqlx::query_as` over internal row types and run
//! under the caller's [`RequestContext`] timeout. Soft-deleted rows are
//! filtered in every read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rest_blueprint_core::{Email, UserId};

use super::{RepositoryError, UserRepository};
use crate::context::RequestContext;
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at, deleted_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id ASC"
        );
        let rows = ctx
            .bound(sqlx::query_as::<_, UserRow>(&sql).fetch_all(&self.pool))
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_by_id(&self, ctx: &RequestContext, id: UserId) -> Result<User, RepositoryError> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        let row = ctx
            .bound(
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn get_by_email(
        &self,
        ctx: &RequestContext,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
        let row = ctx
            .bound(
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(email)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn create(&self, ctx: &RequestContext, user: NewUser) -> Result<User, RepositoryError> {
        let sql = format!("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {USER_COLUMNS}");
        let row = ctx
            .bound(async {
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(&user.name)
                    .bind(&user.email)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| RepositoryError::from_write(e, "email already exists"))
            })
            .await?;

        row.try_into()
    }

    async fn update(&self, ctx: &RequestContext, user: &User) -> Result<(), RepositoryError> {
        let result = ctx
            .bound(async {
                sqlx::query(
                    r"
                    UPDATE users
                    SET name = $1, email = $2, updated_at = NOW()
                    WHERE id = $3 AND deleted_at IS NULL
                    ",
                )
                .bind(&user.name)
                .bind(&user.email)
                .bind(user.id)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::from_write(e, "email already exists"))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, id: UserId) -> Result<(), RepositoryError> {
        let result = ctx
            .bound(
                sqlx::query(
                    r"
                    UPDATE users
                    SET deleted_at = NOW(), updated_at = NOW()
                    WHERE id = $1 AND deleted_at IS NULL
                    ",
                )
                .bind(id)
                .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
