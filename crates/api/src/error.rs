//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>` from their inner logic and turn the
//! error into an envelope with [`AppError::respond`], which logs it with the
//! request ID first. Clients only ever see [`AppError::public_message`].

use std::time::Duration;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::config::ConfigError;
use crate::context::RequestContext;
use crate::db::RepositoryError;
use crate::response::Responder;

/// Application-level error type for handler paths.
#[derive(Debug, Error)]
pub enum AppError {
    /// Path or query input was missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity does not exist among live rows.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store failed (connection, query, timeout, conflict).
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),
}

impl AppError {
    /// Map a single-entity lookup error, naming the entity on `NotFound`.
    #[must_use]
    pub fn from_lookup(err: RepositoryError, entity: &str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(format!("{entity} not found")),
            other => Self::Store(other),
        }
    }

    /// Status code for this error.
    ///
    /// Not-found lookups answer 400 rather than 404; existing clients rely on it.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::Store(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Store(err) => match err {
                RepositoryError::NotFound => "record not found".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Timeout(_) => "request timed out".to_owned(),
                RepositoryError::Database(_)
                | RepositoryError::DataCorruption(_)
                | RepositoryError::Unavailable(_) => "failed to process request".to_owned(),
            },
        }
    }

    /// Log the error against the request and build the error envelope.
    pub fn respond(self, responder: &Responder, ctx: &RequestContext) -> Response {
        match &self {
            Self::Store(RepositoryError::NotFound | RepositoryError::Conflict(_))
            | Self::Validation(_)
            | Self::NotFound(_) => {
                tracing::warn!(error = %self, request_id = %ctx.request_id(), "Request rejected");
            }
            Self::Store(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    request_id = %ctx.request_id(),
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
        }

        responder.error(self.status(), self.public_message())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Reasons the store is considered unhealthy.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("database round trip failed: {0}")]
    Store(#[from] RepositoryError),

    #[error("database round trip timed out after {0:?}")]
    Timeout(Duration),

    #[error("database round trip returned {0}, expected 1")]
    UnexpectedResult(i32),
}

impl HealthError {
    /// Message safe to show to clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "db connect failed".to_owned(),
            Self::Timeout(_) | Self::UnexpectedResult(_) => self.to_string(),
        }
    }
}

/// Failures that stop the service from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to bind to address: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation("Invalid user ID".to_owned());
        assert_eq!(err.to_string(), "Validation error: Invalid user ID");

        let err = AppError::NotFound("user not found".to_owned());
        assert_eq!(err.to_string(), "Not found: user not found");
    }

    #[test]
    fn test_every_handler_error_is_bad_request() {
        assert_eq!(
            AppError::Validation("x".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store(RepositoryError::Timeout(Duration::from_secs(1))).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_from_lookup_names_entity() {
        let err = AppError::from_lookup(RepositoryError::NotFound, "user");
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "user not found"));

        let err = AppError::from_lookup(RepositoryError::Conflict("dup".to_owned()), "user");
        assert!(matches!(err, AppError::Store(RepositoryError::Conflict(_))));
    }

    #[test]
    fn test_public_message_hides_store_detail() {
        let err = AppError::Store(RepositoryError::DataCorruption(
            "invalid email in database: secret-row".to_owned(),
        ));
        assert_eq!(err.public_message(), "failed to process request");

        let err = AppError::Store(RepositoryError::Conflict("email already exists".to_owned()));
        assert_eq!(err.public_message(), "email already exists");

        let err = HealthError::Store(RepositoryError::Unavailable("host=10.0.0.3".to_owned()));
        assert_eq!(err.public_message(), "db connect failed");
    }

    #[test]
    fn test_respond_builds_error_envelope() {
        let responder = Responder::new("0.0.1");
        let ctx = RequestContext::new("req-err", Duration::from_secs(1));

        let response = AppError::NotFound("user not found".to_owned()).respond(&responder, &ctx);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
