//! Person use-case service.
//!
//! # Responsibility
//! - Validate raw form input, then hand normalized shapes to the repository.
//! - Provide create/update/delete/list entry points for core callers.
//!
//! # Invariants
//! - No write reaches the repository without passing `validate_registration`.
//! - Errors are returned unchanged; nothing is retried or swallowed.
//! - Log events carry ids and counts only, never field values.

use crate::model::person::{AddressInput, PersonId, PersonInput, PersonListing};
use crate::model::validation::{validate_registration, ValidationError};
use crate::repo::person_repo::{PersonRepository, RepoError, RepoResult};
use log::{info, warn};

/// Use-case service wrapper for person writes and listing.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a person and its communication address.
    ///
    /// # Contract
    /// - Both rows are written in one transaction.
    /// - Returns the new person id.
    pub fn create(&mut self, person: &PersonInput, address: &AddressInput) -> RepoResult<PersonId> {
        let (person, address) = validate_registration(person, address).map_err(|err| {
            log_rejected("person_create", &err);
            err
        })?;

        let result = self.repo.create_person(&person, &address);
        match &result {
            Ok(id) => info!("event=person_create module=service status=ok person_id={id}"),
            Err(err) => log_failed("person_create", None, err),
        }
        result
    }

    /// Replaces person fields and its communication address.
    ///
    /// # Contract
    /// - Returns `RepoError::NotFound` when `id` does not exist; the address is
    ///   left untouched in that case.
    /// - Inserts the address row if the person has none.
    pub fn update(
        &mut self,
        id: PersonId,
        person: &PersonInput,
        address: &AddressInput,
    ) -> RepoResult<usize> {
        let (person, address) = validate_registration(person, address).map_err(|err| {
            log_rejected("person_update", &err);
            err
        })?;

        let result = self.repo.update_person(id, &person, &address);
        match &result {
            Ok(affected) => info!(
                "event=person_update module=service status=ok person_id={id} affected={affected}"
            ),
            Err(err) => log_failed("person_update", Some(id), err),
        }
        result
    }

    /// Deletes a person; the address row is removed by cascade.
    pub fn delete(&mut self, id: PersonId) -> RepoResult<usize> {
        let result = self.repo.delete_person(id);
        match &result {
            Ok(affected) => info!(
                "event=person_delete module=service status=ok person_id={id} affected={affected}"
            ),
            Err(err) => log_failed("person_delete", Some(id), err),
        }
        result
    }

    /// Lists every person with its communication address, newest first.
    pub fn list_all(&self) -> RepoResult<Vec<PersonListing>> {
        let result = self.repo.list_people();
        match &result {
            Ok(people) => info!(
                "event=person_list module=service status=ok count={}",
                people.len()
            ),
            Err(err) => log_failed("person_list", None, err),
        }
        result
    }

    /// Liveness probe over the underlying connection.
    pub fn test_connection(&self) -> RepoResult<bool> {
        self.repo.ping()
    }

    /// Removes all persons and addresses.
    pub fn clear_all(&mut self) -> RepoResult<()> {
        let result = self.repo.clear_all();
        match &result {
            Ok(()) => info!("event=person_clear module=service status=ok"),
            Err(err) => log_failed("person_clear", None, err),
        }
        result
    }
}

fn log_rejected(event: &str, err: &ValidationError) {
    warn!(
        "event={event} module=service status=rejected field={}",
        err.field()
    );
}

fn log_failed(event: &str, id: Option<PersonId>, err: &RepoError) {
    let error_code = match err {
        RepoError::NotFound(_) => "not_found",
        RepoError::Validation(_) => "validation",
        _ => "storage",
    };
    match id {
        Some(id) => warn!(
            "event={event} module=service status=error person_id={id} error_code={error_code} error={err}"
        ),
        None => warn!("event={event} module=service status=error error_code={error_code} error={err}"),
    }
}
