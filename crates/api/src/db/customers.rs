//! Customer repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use rest_blueprint_core::{CustomerId, Email};

use super::{CustomerRepository, RepositoryError};
use crate::context::RequestContext;
use crate::models::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, address, city, \
     country, date_of_birth, is_active, created_at, updated_at, deleted_at";

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    country: String,
    date_of_birth: Option<NaiveDate>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            country: row.country,
            date_of_birth: row.date_of_birth,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<Customer>, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE deleted_at IS NULL ORDER BY id ASC"
        );
        let rows = ctx
            .bound(sqlx::query_as::<_, CustomerRow>(&sql).fetch_all(&self.pool))
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: CustomerId,
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = ctx
            .bound(
                sqlx::query_as::<_, CustomerRow>(&sql)
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
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1 AND deleted_at IS NULL"
        );
        let row = ctx
            .bound(
                sqlx::query_as::<_, CustomerRow>(&sql)
                    .bind(email)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn get_by_first_name(
        &self,
        ctx: &RequestContext,
        first_name: &str,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE first_name = $1 AND deleted_at IS NULL ORDER BY id ASC"
        );
        let rows = ctx
            .bound(
                sqlx::query_as::<_, CustomerRow>(&sql)
                    .bind(first_name)
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        customer: NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            "INSERT INTO customers \
             (first_name, last_name, email, phone, address, city, country, date_of_birth, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let row = ctx
            .bound(async {
                sqlx::query_as::<_, CustomerRow>(&sql)
                    .bind(&customer.first_name)
                    .bind(&customer.last_name)
                    .bind(&customer.email)
                    .bind(&customer.phone)
                    .bind(&customer.address)
                    .bind(&customer.city)
                    .bind(customer.country_or_default())
                    .bind(customer.date_of_birth)
                    .bind(customer.is_active_or_default())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| RepositoryError::from_write(e, "customer email already exists"))
            })
            .await?;

        row.try_into()
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        customer: &Customer,
    ) -> Result<(), RepositoryError> {
        let result = ctx
            .bound(async {
                sqlx::query(
                    r"
                    UPDATE customers
                    SET first_name = $1, last_name = $2, email = $3, phone = $4,
                        address = $5, city = $6, country = $7, date_of_birth = $8,
                        is_active = $9, updated_at = NOW()
                    WHERE id = $10 AND deleted_at IS NULL
                    ",
                )
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.email)
                .bind(&customer.phone)
                .bind(&customer.address)
                .bind(&customer.city)
                .bind(&customer.country)
                .bind(customer.date_of_birth)
                .bind(customer.is_active)
                .bind(customer.id)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::from_write(e, "customer email already exists"))
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, id: CustomerId) -> Result<(), RepositoryError> {
        let result = ctx
            .bound(
                sqlx::query(
                    r"
                    UPDATE customers
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
