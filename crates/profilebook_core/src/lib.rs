//! Core persistence and validation logic for profilebook.
//! This crate is the single source of truth for person-record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, mask_phone};
pub use model::person::{
    AddressInput, PersonId, PersonInput, PersonListing, PersonView, ValidatedAddress,
    ValidatedPerson,
};
pub use model::validation::{
    normalize_email, normalize_phone, validate_registration, PasswordClass, PersonField,
    ValidationError,
};
pub use repo::person_repo::{
    PersonRepository, PersonStore, RepoError, RepoResult, SqlitePersonRepository,
};
pub use service::auth_service::AuthService;
pub use service::person_service::PersonService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
