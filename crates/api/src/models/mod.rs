//! Domain models served by the API.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Serialization controls the public JSON shape: identifiers,
//! timestamps and the soft-delete marker stay internal.

pub mod customer;
pub mod user;

pub use customer::{Customer, NewCustomer};
pub use user::{NewUser, User};
