//! Email addresses as accepted by the user and customer tables.
//!
//! Validation is structural only: one `@` splitting a non-empty mailbox from a
//! non-empty host, within the RFC 5321 length limit. Whether the mailbox
//! exists is never checked.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Zero or more than one `@`.
    #[error("email must contain exactly one @ symbol, found {found}")]
    AtSymbolCount { found: usize },
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// A structurally valid email address.
///
/// ```
/// use rest_blueprint_core::Email;
///
/// let email = Email::parse("James.Martinez762@outlook.com").unwrap();
/// assert_eq!(email.local_part(), "James.Martinez762");
/// assert_eq!(email.name_token(), "James");
///
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    address: String,
    at: usize,
}

impl Email {
    /// RFC 5321 upper bound on the whole address.
    pub const MAX_LENGTH: usize = 254;

    /// Validate `s` as an email address. The input is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` when `s` is empty or longer than
    /// [`Self::MAX_LENGTH`], when it does not contain exactly one `@`, or when
    /// either side of the `@` is empty.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let found = s.matches('@').count();
        let Some((local, domain)) = s.split_once('@').filter(|_| found == 1) else {
            return Err(EmailError::AtSymbolCount { found });
        };
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self {
            address: s.to_owned(),
            at: local.len(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// Mailbox name, everything before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.address.get(..self.at).unwrap_or_default()
    }

    /// Leading token of the local part, up to the first `.`.
    ///
    /// `James.Martinez762@outlook.com` yields `James`. Used as a first-name
    /// guess when matching users to customers; nothing guarantees it is one.
    /// Empty when the local part starts with `.`.
    #[must_use]
    pub fn name_token(&self) -> &str {
        let local = self.local_part();
        local.split_once('.').map_or(local, |(head, _)| head)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.address
    }
}

// Rows decode the column as `String` and go through `Email::parse`, so only
// the write side is needed here.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_seeded_address_shapes() {
        for raw in [
            "James.Martinez762@outlook.com",
            "anna.sari@email.com",
            "user+tag@company.id",
            "a@b",
        ] {
            let email = Email::parse(raw).unwrap();
            assert_eq!(email.as_str(), raw);
            assert_eq!(email.to_string(), raw);
        }
    }

    #[test]
    fn test_rejects_bad_structure() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(
            Email::parse("no-at-symbol"),
            Err(EmailError::AtSymbolCount { found: 0 })
        );
        assert_eq!(Email::parse("@outlook.com"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("james@"), Err(EmailError::EmptyDomain));

        let long = format!("{}@example.com", "j".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_rejects_more_than_one_at() {
        assert_eq!(
            Email::parse("a@b@c"),
            Err(EmailError::AtSymbolCount { found: 2 })
        );
        assert!(Email::parse("james@@outlook.com").is_err());
    }

    #[test]
    fn test_local_part_and_name_token() {
        let email = Email::parse("James.Martinez762@outlook.com").unwrap();
        assert_eq!(email.local_part(), "James.Martinez762");
        assert_eq!(email.name_token(), "James");

        let email = Email::parse("linda@example.com").unwrap();
        assert_eq!(email.name_token(), "linda");

        let email = Email::parse("anna.maria.lopez@example.com").unwrap();
        assert_eq!(email.name_token(), "anna");
    }

    #[test]
    fn test_name_token_leading_dot_is_empty() {
        let email = Email::parse(".hidden@example.com").unwrap();
        assert_eq!(email.name_token(), "");
    }

    #[test]
    fn test_json_is_plain_string_and_validated() {
        let email = Email::parse("anna.sari@email.com").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"anna.sari@email.com\""
        );

        let back: Email = serde_json::from_str("\"anna.sari@email.com\"").unwrap();
        assert_eq!(back, email);

        assert!(serde_json::from_str::<Email>("\"a@b@c\"").is_err());
    }
}
