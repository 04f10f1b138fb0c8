//! `GET /api/v1/users`: every live user, ordered by id.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, response::Response};

use crate::context::RequestContext;
use crate::db::{RepositoryError, UserRepository};
use crate::error::Result;
use crate::models::User;
use crate::response::Responder;
use crate::state::AppState;

/// Store capabilities this feature needs.
#[async_trait]
pub trait Repositories: Send + Sync {
    async fn get_all(&self, ctx: &RequestContext) -> std::result::Result<Vec<User>, RepositoryError>;
}

/// Composes the shared user repository.
pub struct RepositoryImpl {
    users: Arc<dyn UserRepository>,
}

impl RepositoryImpl {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Repositories for RepositoryImpl {
    async fn get_all(&self, ctx: &RequestContext) -> std::result::Result<Vec<User>, RepositoryError> {
        self.users.get_all(ctx).await
    }
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
            Arc::new(RepositoryImpl::new(state.users())),
            state.responder().clone(),
        )
    }

    /// Fetch every live user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store call fails.
    pub async fn run(&self, ctx: &RequestContext) -> Result<Vec<User>> {
        Ok(self.repo.get_all(ctx).await?)
    }
}

pub async fn handle(State(handler): State<Handler>, ctx: RequestContext) -> Response {
    match handler.run(&ctx).await {
        Ok(users) => handler.responder.ok(users),
        Err(err) => err.respond(&handler.responder, &ctx),
    }
}
