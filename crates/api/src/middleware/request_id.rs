//! Request ID middleware for request tracing and correlation.
//!
//! Uses the inbound `x-request-id` header when it carries non-blank header
//! text, otherwise generates a UUID v4. The ID is:
//! - Stored in the request extensions as part of a [`RequestContext`]
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::context::{RequestContext, generate_request_id};
use crate::state::AppState;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = inbound_request_id(request.headers()).unwrap_or_else(generate_request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let ctx = RequestContext::new(request_id.as_str(), state.config().db.query_timeout());
    request.extensions_mut().insert(ctx);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// The inbound ID, if present, valid header text and not blank.
fn inbound_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
}
