//! Credential lookup service.
//!
//! # Responsibility
//! - Match phone + password against stored person rows.
//! - Return the sanitized `PersonView` of the matched identity.
//!
//! # Invariants
//! - Matching is exact and case-sensitive; the password is never normalized.
//! - "No match" is `Ok(None)`, not an error.
//! - When several rows share phone and password, the lowest id wins.
//! - Passwords never reach logs; phones are masked.

use crate::logging::mask_phone;
use crate::model::person::PersonView;
use crate::repo::person_repo::{PersonRepository, RepoResult};
use log::{info, warn};

/// Read-only authentication service.
pub struct AuthService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Looks up the person owning `phone` + `password`.
    ///
    /// `phone` is expected in digits-only form; see
    /// [`crate::model::validation::normalize_phone`].
    pub fn authenticate(&self, phone: &str, password: &str) -> RepoResult<Option<PersonView>> {
        let result = self.repo.find_by_credentials(phone, password);
        match &result {
            Ok(Some(view)) => info!(
                "event=auth module=service status=ok phone={} person_id={}",
                mask_phone(phone),
                view.id
            ),
            Ok(None) => info!(
                "event=auth module=service status=no_match phone={}",
                mask_phone(phone)
            ),
            Err(err) => warn!(
                "event=auth module=service status=error phone={} error={}",
                mask_phone(phone),
                err
            ),
        }
        result
    }
}
