//! Access log middleware.
//!
//! Emits one structured event per completed request. Everything logged while
//! the request is handled is nested in an `http_request` span carrying the
//! service name, version and request ID.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Level};

use super::client_ip::resolve_client_ip;
use crate::context::RequestContext;
use crate::state::AppState;

/// Log level for a completed request with this status.
#[must_use]
pub const fn level_for_status(status: StatusCode) -> Level {
    match status.as_u16() {
        500.. => Level::ERROR,
        400..=499 => Level::WARN,
        300..=399 => Level::DEBUG,
        _ => Level::INFO,
    }
}

macro_rules! access_event {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($fields)+),
            Level::WARN => tracing::warn!($($fields)+),
            Level::DEBUG => tracing::debug!($($fields)+),
            Level::TRACE => tracing::trace!($($fields)+),
            _ => tracing::info!($($fields)+),
        }
    };
}

/// Middleware that records method, route, client, status and latency.
///
/// Must run inside the request ID middleware so the context is available.
pub async fn access_log_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_owned(),
        |matched| matched.as_str().to_owned(),
    );
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = resolve_client_ip(request.headers(), peer);
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id().to_owned())
        .unwrap_or_default();

    let span = tracing::info_span!(
        "http_request",
        app = %state.config().app.name,
        app_version = %state.responder().app_version(),
        request_id = %request_id,
    );
    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    span.in_scope(|| {
        access_event!(
            level_for_status(status),
            method = %method,
            path = %path,
            client_ip = %client_ip,
            status = status.as_u16(),
            latency_ms,
            request_id = %request_id,
            "http request"
        );
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_status() {
        assert_eq!(level_for_status(StatusCode::OK), Level::INFO);
        assert_eq!(level_for_status(StatusCode::FOUND), Level::DEBUG);
        assert_eq!(level_for_status(StatusCode::BAD_REQUEST), Level::WARN);
        assert_eq!(level_for_status(StatusCode::NOT_FOUND), Level::WARN);
        assert_eq!(level_for_status(StatusCode::BAD_GATEWAY), Level::ERROR);
        assert_eq!(level_for_status(StatusCode::INTERNAL_SERVER_ERROR), Level::ERROR);
    }
}
