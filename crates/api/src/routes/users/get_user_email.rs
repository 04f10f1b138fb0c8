//! `GET /api/v1/users/email?email=...`: a user plus the customers sharing
//! the first name guessed from the email.
//!
//! The guess is the local part up to the first `.`, so
//! `James.Martinez762@outlook.com` matches customers named exactly `James`.
//! Zero, one or many customers may match; none of them is necessarily the
//! same person as the user.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use serde::{Deserialize, Serialize};

use rest_blueprint_core::Email;

use crate::context::RequestContext;
use crate::db::{CustomerRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Customer, User};
use crate::response::Responder;
use crate::state::AppState;

const INVALID_EMAIL: &str = "invalid email format";

/// Store capabilities this feature needs.
#[async_trait]
pub trait Repositories: Send + Sync {
    async fn get_by_email(
        &self,
        ctx: &RequestContext,
        email: &Email,
    ) -> std::result::Result<User, RepositoryError>;

    async fn get_customer_first_name(
        &self,
        ctx: &RequestContext,
        first_name: &str,
    ) -> std::result::Result<Vec<Customer>, RepositoryError>;
}

/// Composes the shared user and customer repositories.
pub struct RepositoryImpl {
    users: Arc<dyn UserRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl RepositoryImpl {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, customers: Arc<dyn CustomerRepository>) -> Self {
        Self { users, customers }
    }
}

#[async_trait]
impl Repositories for RepositoryImpl {
    async fn get_by_email(
        &self,
        ctx: &RequestContext,
        email: &Email,
    ) -> std::result::Result<User, RepositoryError> {
        self.users.get_by_email(ctx, email).await
    }

    async fn get_customer_first_name(
        &self,
        ctx: &RequestContext,
        first_name: &str,
    ) -> std::result::Result<Vec<Customer>, RepositoryError> {
        self.customers.get_by_first_name(ctx, first_name).await
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// Response payload: the user and the first-name matches.
#[derive(Debug, Serialize)]
pub struct UserWithCustomers {
    pub user: User,
    pub customer: Vec<Customer>,
}

#[derive(Clone)]
pub struct Handler {
    repo: Arc<dyn Repositories>,
    responder: Responder,
}

impl Handler {
    #[must_use]
    pub fn new(repo: Arc<dyn Repositories>, responder: Responder) -> Self {
        Self { repo, responder }
    }

    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::new(RepositoryImpl::new(state.users(), state.customers())),
            state.responder().clone(),
        )
    }

    /// Resolve the user by email, then the customers sharing its name token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty or malformed email,
    /// `AppError::NotFound` when no live user has it, and `AppError::Store`
    /// for store failures.
    pub async fn run(&self, ctx: &RequestContext, raw_email: Option<&str>) -> Result<UserWithCustomers> {
        let raw_email = raw_email.map(str::trim).unwrap_or_default();
        if raw_email.is_empty() {
            return Err(AppError::Validation("user email can`t be empty".to_owned()));
        }

        let email =
            Email::parse(raw_email).map_err(|_| AppError::Validation(INVALID_EMAIL.to_owned()))?;

        let user = self
            .repo
            .get_by_email(ctx, &email)
            .await
            .map_err(|err| AppError::from_lookup(err, "user"))?;

        let first_name = email.name_token();
        let customer = if first_name.is_empty() {
            Vec::new()
        } else {
            self.repo.get_customer_first_name(ctx, first_name).await?
        };

        Ok(UserWithCustomers { user, customer })
    }
}

pub async fn handle(
    State(handler): State<Handler>,
    ctx: RequestContext,
    query: std::result::Result<Query<EmailQuery>, QueryRejection>,
) -> Response {
    let result = match query {
        Ok(Query(query)) => handler.run(&ctx, query.email.as_deref()).await,
        Err(rejection) => {
            tracing::debug!(
                rejection = %rejection.body_text(),
                request_id = %ctx.request_id(),
                "Malformed email query"
            );
            Err(AppError::Validation(INVALID_EMAIL.to_owned()))
        }
    };

    match result {
        Ok(payload) => handler.responder.ok(payload),
        Err(err) => err.respond(&handler.responder, &ctx),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::Utc;
    use rest_blueprint_core::{CustomerId, UserId};

    use super::*;
    use crate::models::customer::DEFAULT_COUNTRY;

    #[derive(Default)]
    struct FakeRepo {
        users: Vec<User>,
        customers: Vec<Customer>,
        customer_calls: AtomicUsize,
    }

    #[async_trait]
    impl Repositories for FakeRepo {
        async fn get_by_email(
            &self,
            _ctx: &RequestContext,
            email: &Email,
        ) -> std::result::Result<User, RepositoryError> {
            self.users
                .iter()
                .find(|u| &u.email == email)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        }

        async fn get_customer_first_name(
            &self,
            _ctx: &RequestContext,
            first_name: &str,
        ) -> std::result::Result<Vec<Customer>, RepositoryError> {
            self.customer_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .customers
                .iter()
                .filter(|c| c.first_name == first_name)
                .cloned()
                .collect())
        }
    }

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            name: "James Martinez".to_owned(),
            email: Email::parse(email).unwrap(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn customer(id: i32, first_name: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: CustomerId::new(id),
            first_name: first_name.to_owned(),
            last_name: "Santoso".to_owned(),
            email: Email::parse(&format!("c{id}@example.com")).unwrap(),
            phone: None,
            address: None,
            city: None,
            country: DEFAULT_COUNTRY.to_owned(),
            date_of_birth: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new("req-email", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_returns_user_and_exact_first_name_matches() {
        let repo = FakeRepo {
            users: vec![user("James.Martinez762@outlook.com")],
            customers: vec![customer(1, "James"), customer(2, "Jameson"), customer(3, "James")],
            ..FakeRepo::default()
        };
        let handler = Handler::new(Arc::new(repo), Responder::new("test"));

        let payload = handler
            .run(&ctx(), Some("James.Martinez762@outlook.com"))
            .await
            .unwrap();
        assert_eq!(payload.user.name, "James Martinez");
        assert_eq!(payload.customer.len(), 2);
        assert!(payload.customer.iter().all(|c| c.first_name == "James"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_email_is_rejected() {
        let handler = Handler::new(Arc::new(FakeRepo::default()), Responder::new("test"));

        for raw in [None, Some(""), Some("  ")] {
            let err = handler.run(&ctx(), raw).await.unwrap_err();
            assert!(
                matches!(err, AppError::Validation(ref msg) if msg == "user email can`t be empty")
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_email_is_rejected() {
        let handler = Handler::new(Arc::new(FakeRepo::default()), Responder::new("test"));
        let err = handler.run(&ctx(), Some("no-at-symbol")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "invalid email format"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let handler = Handler::new(Arc::new(FakeRepo::default()), Responder::new("test"));
        let err = handler
            .run(&ctx(), Some("nobody@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_name_token_skips_customer_lookup() {
        let repo = Arc::new(FakeRepo {
            users: vec![user(".hidden@example.com")],
            customers: vec![customer(1, "")],
            ..FakeRepo::default()
        });
        let handler = Handler::new(repo.clone(), Responder::new("test"));

        let payload = handler
            .run(&ctx(), Some(".hidden@example.com"))
            .await
            .unwrap();
        assert!(payload.customer.is_empty());
        assert_eq!(repo.customer_calls.load(Ordering::SeqCst), 0);
    }
}
