//! Store health check.
//!
//! Healthy exactly when `SELECT 1` answers 1 within [`HEALTH_TIMEOUT`].

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::Response};

use crate::context::RequestContext;
use crate::db::Liveness;
use crate::error::HealthError;
use crate::response::Responder;
use crate::state::AppState;

/// Upper bound for the health round trip.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Handler {
    liveness: Arc<dyn Liveness>,
    responder: Responder,
    timeout: Duration,
}

impl Handler {
    #[must_use]
    pub fn new(liveness: Arc<dyn Liveness>, responder: Responder, timeout: Duration) -> Self {
        Self {
            liveness,
            responder,
            timeout,
        }
    }

    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.liveness(), state.responder().clone(), HEALTH_TIMEOUT)
    }

    /// Run the round trip under the health timeout.
    ///
    /// # Errors
    ///
    /// Returns `HealthError` when the store fails, is too slow, or answers
    /// with anything other than 1.
    pub async fn check(&self) -> Result<(), HealthError> {
        match tokio::time::timeout(self.timeout, self.liveness.round_trip()).await {
            Err(_) => Err(HealthError::Timeout(self.timeout)),
            Ok(Err(err)) => Err(HealthError::Store(err)),
            Ok(Ok(1)) => Ok(()),
            Ok(Ok(other)) => Err(HealthError::UnexpectedResult(other)),
        }
    }
}

/// `GET /health`
pub async fn handle(State(handler): State<Handler>, ctx: RequestContext) -> Response {
    match handler.check().await {
        Ok(()) => handler.responder.ok_message("db connect ok"),
        Err(err) => {
            tracing::error!(
                error = %err,
                request_id = %ctx.request_id(),
                "Database health check failed"
            );
            handler
                .responder
                .error(StatusCode::BAD_GATEWAY, err.public_message())
        }
    }
}
