//! `GET /api/v1/users/{id}`: one live user.
//!
//! Records a "user profile accessed" event before the lookup. That side
//! effect never fails the request.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    response::Response,
};

use rest_blueprint_core::UserId;

use crate::context::RequestContext;
use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::ClientIp;
use crate::models::User;
use crate::response::Responder;
use crate::state::AppState;

/// Store capabilities this feature needs.
#[async_trait]
pub trait Repositories: Send + Sync {
    async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: UserId,
    ) -> std::result::Result<User, RepositoryError>;

    /// Record that a user's profile was requested.
    async fn log_user_access(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        requester_ip: &str,
    ) -> std::result::Result<(), RepositoryError>;
}

/// Composes the shared user repository and adds the access event.
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
    async fn get_by_id(
        &self,
        ctx: &RequestContext,
        id: UserId,
    ) -> std::result::Result<User, RepositoryError> {
        self.users.get_by_id(ctx, id).await
    }

    async fn log_user_access(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        requester_ip: &str,
    ) -> std::result::Result<(), RepositoryError> {
        tracing::info!(
            user_id = user_id.as_i32(),
            requester_ip,
            request_id = %ctx.request_id(),
            "user profile accessed"
        );
        Ok(())
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

    /// Parse the id, record the access and fetch the user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a non-numeric id, `AppError::NotFound`
    /// when no live user has it, and `AppError::Store` for store failures.
    pub async fn run(&self, ctx: &RequestContext, raw_id: &str, requester_ip: &str) -> Result<User> {
        let id: UserId = raw_id
            .parse()
            .map_err(|_| AppError::Validation("Invalid user ID".to_owned()))?;

        if let Err(err) = self.repo.log_user_access(ctx, id, requester_ip).await {
            tracing::warn!(
                error = %err,
                user_id = id.as_i32(),
                request_id = %ctx.request_id(),
                "Failed to record user access"
            );
        }

        self.repo
            .get_by_id(ctx, id)
            .await
            .map_err(|err| AppError::from_lookup(err, "user"))
    }
}

pub async fn handle(
    State(handler): State<Handler>,
    ctx: RequestContext,
    ClientIp(client_ip): ClientIp,
    Path(raw_id): Path<String>,
) -> Response {
    match handler.run(&ctx, &raw_id, &client_ip).await {
        Ok(user) => handler.responder.ok(user),
        Err(err) => err.respond(&handler.responder, &ctx),
    }
}
