//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rest_blueprint_core::{Email, UserId};

/// An application user (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Store-assigned identifier.
    #[serde(skip_serializing)]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique among non-deleted users.
    pub email: Email,
    /// When the user was created.
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Repositories never return rows where this is set.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
}
