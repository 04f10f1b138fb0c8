//! Per-request context threaded from middleware through handlers into repositories.
//!
//! The request ID middleware builds a [`RequestContext`] for every request and
//! stores it in the request extensions. Handlers extract it and pass it by
//! reference to every repository call, which uses it to bound store round trips
//! and to tag log events.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::db::RepositoryError;

/// Store timeout applied when nothing else configured one.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Correlation ID and store deadline for one unit of work.
///
/// Cheap to clone; the request ID is shared.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Arc<str>,
    query_timeout: Duration,
}

impl RequestContext {
    /// Context for an HTTP request with a known correlation ID.
    #[must_use]
    pub fn new(request_id: impl Into<Arc<str>>, query_timeout: Duration) -> Self {
        Self {
            request_id: request_id.into(),
            query_timeout,
        }
    }

    /// Context for work that did not originate from a request (CLI, startup).
    ///
    /// A fresh correlation ID is generated so log lines can still be grouped.
    #[must_use]
    pub fn background(query_timeout: Duration) -> Self {
        Self::new(generate_request_id(), query_timeout)
    }

    /// The correlation ID for this unit of work.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Upper bound for a single store round trip.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Run one store round trip under this context's timeout.
    ///
    /// The inner future is dropped when the timeout fires, which cancels the
    /// query and returns its connection to the pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` if the deadline passes, otherwise the
    /// inner error converted into `RepositoryError`.
    pub async fn bound<T, E, F>(&self, fut: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<RepositoryError>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    timeout_ms = u64::try_from(self.query_timeout.as_millis()).unwrap_or(u64::MAX),
                    "store call timed out"
                );
                Err(RepositoryError::Timeout(self.query_timeout))
            }
        }
    }
}

/// Generate a new correlation ID (UUID v4, hyphenated).
#[must_use]
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    /// Takes the context installed by the request ID middleware, or builds a
    /// fresh one when a handler is mounted without it.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::background(DEFAULT_QUERY_TIMEOUT)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_background_contexts_get_distinct_ids() {
        let a = RequestContext::background(DEFAULT_QUERY_TIMEOUT);
        let b = RequestContext::background(DEFAULT_QUERY_TIMEOUT);
        assert!(!a.request_id().is_empty());
        assert_ne!(a.request_id(), b.request_id());
    }

    #[tokio::test]
    async fn test_bound_passes_through_result() {
        let ctx = RequestContext::new("req-1", Duration::from_secs(1));
        let value = ctx
            .bound(async { Ok::<_, RepositoryError>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);

        let err = ctx
            .bound(async { Err::<(), _>(RepositoryError::NotFound) })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_bound_times_out() {
        let ctx = RequestContext::new("req-slow", Duration::from_millis(20));
        let err = ctx
            .bound(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, RepositoryError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Timeout(_)));
    }
}
