//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Store round trip
//!
//! # Users
//! GET  /api/v1/users               - All live users
//! GET  /api/v1/users/email?email=  - User by email plus first-name customer matches
//! GET  /api/v1/users/{id}          - User by id
//! ```
//!
//! Anything else answers with a 404 envelope. A request still running after
//! `app.request_timeout_secs` is abandoned with a 408 envelope.

pub mod health;
pub mod users;

use std::any::Any;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::context::RequestContext;
use crate::middleware::{access_log_middleware, request_id_middleware};
use crate::response::Responder;
use crate::state::AppState;

/// Version prefix for the public API.
pub const API_PREFIX: &str = "/api/v1";

/// Build the application router with the full middleware chain.
pub fn router(state: AppState) -> Router {
    let panic_responder = state.responder().clone();
    let request_timeout = state.config().app.request_timeout();

    Router::new()
        .route(
            "/health",
            get(health::handle).with_state(health::Handler::from_state(&state)),
        )
        .merge(users::routes(API_PREFIX, &state))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(&panic_responder, &*panic),
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), timeout_envelope))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_log_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_id_middleware,
        ))
        .with_state(state)
}

async fn not_found(State(state): State<AppState>, ctx: RequestContext) -> Response {
    tracing::debug!(request_id = %ctx.request_id(), "No route matched");
    state
        .responder()
        .error(StatusCode::NOT_FOUND, "route not found")
}

/// Replace the bare 408 from the timeout layer with an envelope.
async fn timeout_envelope(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    tracing::warn!(
        timeout_secs = state.config().app.request_timeout_secs,
        "Request exceeded deadline"
    );
    state
        .responder()
        .error(StatusCode::REQUEST_TIMEOUT, "request timed out")
}

fn panic_response(responder: &Responder, panic: &(dyn Any + Send)) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "Handler panicked");

    responder.error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
