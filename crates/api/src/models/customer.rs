//! Customer domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rest_blueprint_core::{CustomerId, Email};

/// Country assigned to customers created without one.
pub const DEFAULT_COUNTRY: &str = "Indonesia";

/// A customer record (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Store-assigned identifier.
    #[serde(skip_serializing)]
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    /// Email address, unique among non-deleted customers.
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Returns the first and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields required to create a customer.
///
/// `country` falls back to [`DEFAULT_COUNTRY`] and `is_active` to `true`
/// when left unset.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl NewCustomer {
    /// Country to persist, applying the default.
    #[must_use]
    pub fn country_or_default(&self) -> &str {
        self.country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    /// Active flag to persist, applying the default.
    #[must_use]
    pub fn is_active_or_default(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}
