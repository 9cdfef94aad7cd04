//! Person domain model.
//!
//! # Responsibility
//! - Define the caller-facing input shapes (`PersonInput`, `AddressInput`).
//! - Define the validated shapes accepted by write paths.
//! - Define the sanitized read models returned by list and auth paths.
//!
//! # Invariants
//! - `ValidatedPerson` / `ValidatedAddress` fields are private; the only
//!   constructor is the field validator.
//! - `PersonView` and `PersonListing` have no password field.

use serde::{Deserialize, Serialize};

/// System-assigned row id of a `personal_details` record.
pub type PersonId = i64;

/// Raw person form input as received from the presentation layer.
///
/// All values are unvalidated strings; `age` is parsed during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub permanent_address: String,
    pub password: String,
}

/// Raw communication address input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub communication_address: String,
}

/// Person fields after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPerson {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) age: u8,
    pub(crate) permanent_address: String,
    pub(crate) password: String,
}

impl ValidatedPerson {
    /// Trimmed display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Digits-only phone, always 10 characters.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Age in `1..=150`.
    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn permanent_address(&self) -> &str {
        &self.permanent_address
    }

    /// Trimmed plaintext password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Communication address after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAddress {
    pub(crate) communication_address: String,
}

impl ValidatedAddress {
    pub fn communication_address(&self) -> &str {
        &self.communication_address
    }
}

/// Public identity fields of a person. Never includes the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
    pub id: PersonId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u8,
    pub permanent_address: String,
}

/// Denormalized list row: person joined with its communication address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonListing {
    #[serde(flatten)]
    pub person: PersonView,
    /// `None` only when the address row is missing, which normal writes
    /// never produce.
    pub communication_address: Option<String>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Last update timestamp in epoch milliseconds.
    pub updated_at: i64,
}
