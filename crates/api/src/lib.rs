//! REST Blueprint API library.
//!
//! Router, middleware, repositories and feature handlers over the `users`
//! and `customers` tables. The binary in `main.rs` wires them to a
//! `PostgreSQL` pool; tests wire them to [`db::InMemoryStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use routes::router;
pub use state::AppState;
