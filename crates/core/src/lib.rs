//! REST Blueprint Core - Shared types library.
//!
//! This crate provides common types used across the blueprint components:
//! - `api` - The HTTP service (router, middleware, repositories)
//! - `cli` - Command-line tools for migrations and sample data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
