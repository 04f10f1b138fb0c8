//! User feature handlers.
//!
//! Each feature declares the narrow `Repositories` trait it depends on and a
//! `RepositoryImpl` composing the shared repositories behind it.

pub mod get_all_user;
pub mod get_user_by_id;
pub mod get_user_email;

use axum::{Router, routing::get};

use crate::state::AppState;

/// User routes, mounted under `prefix`.
pub fn routes(prefix: &str, state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{prefix}/users"),
            get(get_all_user::handle).with_state(get_all_user::Handler::from_state(state)),
        )
        .route(
            &format!("{prefix}/users/email"),
            get(get_user_email::handle).with_state(get_user_email::Handler::from_state(state)),
        )
        .route(
            &format!("{prefix}/users/{{id}}"),
            get(get_user_by_id::handle).with_state(get_user_by_id::Handler::from_state(state)),
        )
}
