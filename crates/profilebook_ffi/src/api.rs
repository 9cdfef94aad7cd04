//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose initialize/auth/CRUD/list functions to the UI via FRB.
//! - Own the process store slot and the database path configuration.
//! - Flatten core errors into response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every store operation before a successful `initialize` reports
//!   `error_kind = "not_initialized"`.
//! - A failed `initialize` empties the slot.
//! - Responses never carry a password.

use log::{error, info};
use profilebook_core::db::{open_db, DbError};
use profilebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, normalize_phone,
    ping as ping_inner, AddressInput, AuthService, PersonInput, PersonListing, PersonService,
    PersonStore, PersonView, RepoError, RepoResult, SqlitePersonRepository,
};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const DB_FILE_NAME: &str = "PersonalDetailsDB.sqlite3";
const DB_PATH_ENV: &str = "PROFILEBOOK_DB_PATH";

static STORE: StoreSlot = StoreSlot::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Registration/edit form as submitted by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Raw age text; validated as an integer in `1..=150`.
    pub age: String,
    pub permanent_address: String,
    pub password: String,
    pub communication_address: String,
}

impl PersonForm {
    fn split(self) -> (PersonInput, AddressInput) {
        (
            PersonInput {
                name: self.name,
                email: self.email,
                phone: self.phone,
                age: self.age,
                permanent_address: self.permanent_address,
                password: self.password,
            },
            AddressInput {
                communication_address: self.communication_address,
            },
        )
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created person id (`create_person` only).
    pub person_id: Option<i64>,
    /// Rows affected (`update_person` / `delete_person` only).
    pub affected: Option<u64>,
    /// `validation|not_found|storage|not_initialized`, `None` on success.
    pub error_kind: Option<String>,
    /// Failing field for `validation` errors.
    pub field: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl StoreActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            ..Self::default()
        }
    }

    fn failure(operation: &str, err: &RepoError) -> Self {
        Self {
            ok: false,
            error_kind: Some(error_kind(err).to_string()),
            field: error_field(err),
            message: format!("{operation} failed: {err}"),
            ..Self::default()
        }
    }
}

/// Public identity returned by login. No password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub permanent_address: String,
}

impl From<PersonView> for PersonSummary {
    fn from(view: PersonView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            email: view.email,
            phone: view.phone,
            age: u32::from(view.age),
            permanent_address: view.permanent_address,
        }
    }
}

/// Login response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// Whether the lookup itself ran; `false` only on storage failures.
    pub ok: bool,
    /// Matched identity; `None` when credentials do not match.
    pub person: Option<PersonSummary>,
    pub error_kind: Option<String>,
    pub message: String,
}

/// One row of the records screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonItem {
    pub person: PersonSummary,
    /// Empty when the person has no address row.
    pub communication_address: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl From<PersonListing> for PersonItem {
    fn from(listing: PersonListing) -> Self {
        Self {
            person: listing.person.into(),
            communication_address: listing.communication_address.unwrap_or_default(),
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

/// Records list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleListResponse {
    pub ok: bool,
    /// Newest first.
    pub items: Vec<PersonItem>,
    pub error_kind: Option<String>,
    pub message: String,
}

/// Opens the store, enables foreign keys and resets the schema.
///
/// Path resolution: `db_path` if non-blank, else `PROFILEBOOK_DB_PATH`,
/// else `<temp_dir>/PersonalDetailsDB.sqlite3`. Existing rows are wiped.
#[flutter_rust_bridge::frb(sync)]
pub fn initialize(db_path: Option<String>) -> StoreActionResponse {
    initialize_in(&STORE, &resolve_db_path(db_path))
}

/// Looks up a person by phone and password.
///
/// The phone is reduced to digits before lookup; the password is matched
/// exactly.
#[flutter_rust_bridge::frb(sync)]
pub fn authenticate(phone: String, password: String) -> AuthResponse {
    authenticate_in(&STORE, &phone, &password)
}

/// Registers a person with its communication address.
#[flutter_rust_bridge::frb(sync)]
pub fn create_person(form: PersonForm) -> StoreActionResponse {
    create_person_in(&STORE, form)
}

/// Replaces a person's fields and communication address.
#[flutter_rust_bridge::frb(sync)]
pub fn update_person(id: i64, form: PersonForm) -> StoreActionResponse {
    update_person_in(&STORE, id, form)
}

/// Deletes a person and, by cascade, its communication address.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_person(id: i64) -> StoreActionResponse {
    delete_person_in(&STORE, id)
}

/// Lists all people with their communication address, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn list_people() -> PeopleListResponse {
    list_people_in(&STORE)
}

/// Runs a no-op query against the store.
#[flutter_rust_bridge::frb(sync)]
pub fn test_connection() -> StoreActionResponse {
    test_connection_in(&STORE)
}

/// Deletes every stored person and address.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_all_data() -> StoreActionResponse {
    clear_all_data_in(&STORE)
}

/// Process-wide holder of the single store connection.
///
/// Table readiness is checked once in `initialize`; later calls reuse the
/// checked store.
struct StoreSlot {
    store: Mutex<Option<PersonStore>>,
}

impl StoreSlot {
    const fn new() -> Self {
        Self {
            store: Mutex::new(None),
        }
    }

    fn initialize(&self, path: &Path) -> RepoResult<()> {
        let mut slot = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        // Release the previous connection before reopening the same file.
        *slot = None;
        *slot = Some(PersonStore::try_new(open_db(path)?)?);
        Ok(())
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut PersonStore) -> RepoResult<T>) -> RepoResult<T> {
        let mut slot = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let store = slot
            .as_mut()
            .ok_or(RepoError::Db(DbError::NotInitialized))?;
        f(store)
    }
}

fn initialize_in(slot: &StoreSlot, path: &Path) -> StoreActionResponse {
    match slot.initialize(path) {
        Ok(()) => {
            info!(
                "event=store_initialize module=ffi status=ok db_path={}",
                path.display()
            );
            StoreActionResponse::success("Database initialized.")
        }
        Err(err) => {
            error!(
                "event=store_initialize module=ffi status=error db_path={} error={}",
                path.display(),
                err
            );
            StoreActionResponse::failure("initialize", &err)
        }
    }
}

fn authenticate_in(slot: &StoreSlot, phone: &str, password: &str) -> AuthResponse {
    let phone = normalize_phone(phone);
    let result = slot.with_store(|store| {
        let auth = AuthService::new(store.repository());
        auth.authenticate(&phone, password)
    });

    match result {
        Ok(Some(view)) => AuthResponse {
            ok: true,
            person: Some(view.into()),
            error_kind: None,
            message: "Login successful.".to_string(),
        },
        Ok(None) => AuthResponse {
            ok: true,
            person: None,
            error_kind: None,
            message: "Invalid phone number or password.".to_string(),
        },
        Err(err) => AuthResponse {
            ok: false,
            person: None,
            error_kind: Some(error_kind(&err).to_string()),
            message: format!("authenticate failed: {err}"),
        },
    }
}

fn create_person_in(slot: &StoreSlot, form: PersonForm) -> StoreActionResponse {
    let (person, address) = form.split();
    let result = with_person_service(slot, |service| service.create(&person, &address));
    match result {
        Ok(id) => StoreActionResponse {
            person_id: Some(id),
            ..StoreActionResponse::success("Person created.")
        },
        Err(err) => StoreActionResponse::failure("create_person", &err),
    }
}

fn update_person_in(slot: &StoreSlot, id: i64, form: PersonForm) -> StoreActionResponse {
    let (person, address) = form.split();
    let result = with_person_service(slot, |service| service.update(id, &person, &address));
    match result {
        Ok(affected) => StoreActionResponse {
            affected: Some(affected as u64),
            ..StoreActionResponse::success("Person updated.")
        },
        Err(err) => StoreActionResponse::failure("update_person", &err),
    }
}

fn delete_person_in(slot: &StoreSlot, id: i64) -> StoreActionResponse {
    match with_person_service(slot, |service| service.delete(id)) {
        Ok(affected) => StoreActionResponse {
            affected: Some(affected as u64),
            ..StoreActionResponse::success("Person deleted.")
        },
        Err(err) => StoreActionResponse::failure("delete_person", &err),
    }
}

fn list_people_in(slot: &StoreSlot) -> PeopleListResponse {
    match with_person_service(slot, |service| service.list_all()) {
        Ok(people) => {
            let items = people.into_iter().map(PersonItem::from).collect::<Vec<_>>();
            let message = format!("Found {} record(s).", items.len());
            PeopleListResponse {
                ok: true,
                items,
                error_kind: None,
                message,
            }
        }
        Err(err) => PeopleListResponse {
            ok: false,
            items: Vec::new(),
            error_kind: Some(error_kind(&err).to_string()),
            message: format!("list_people failed: {err}"),
        },
    }
}

fn test_connection_in(slot: &StoreSlot) -> StoreActionResponse {
    match with_person_service(slot, |service| service.test_connection()) {
        Ok(true) => StoreActionResponse::success("Database connection OK."),
        Ok(false) => StoreActionResponse {
            ok: false,
            error_kind: Some("storage".to_string()),
            message: "test_connection failed: unexpected ping result".to_string(),
            ..StoreActionResponse::default()
        },
        Err(err) => StoreActionResponse::failure("test_connection", &err),
    }
}

fn clear_all_data_in(slot: &StoreSlot) -> StoreActionResponse {
    match with_person_service(slot, |service| service.clear_all()) {
        Ok(()) => StoreActionResponse::success("All data cleared."),
        Err(err) => StoreActionResponse::failure("clear_all_data", &err),
    }
}

fn with_person_service<T>(
    slot: &StoreSlot,
    f: impl FnOnce(&mut PersonService<SqlitePersonRepository<'_>>) -> RepoResult<T>,
) -> RepoResult<T> {
    slot.with_store(|store| {
        let mut service = PersonService::new(store.repository());
        f(&mut service)
    })
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    if let Some(raw) = explicit {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn error_kind(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::NotFound(_) => "not_found",
        RepoError::Db(DbError::NotInitialized) => "not_initialized",
        RepoError::Db(DbError::Sqlite(_))
        | RepoError::InvalidData(_)
        | RepoError::MissingRequiredTable(_)
        | RepoError::MissingRequiredColumn { .. } => "storage",
    }
}

fn error_field(err: &RepoError) -> Option<String> {
    match err {
        RepoError::Validation(validation) => Some(validation.field().as_str().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann_form() -> PersonForm {
        PersonForm {
            name: "Ann".to_string(),
            email: "Ann@X.com".to_string(),
            phone: "9876543210".to_string(),
            age: "30".to_string(),
            permanent_address: "123 Long Street Name".to_string(),
            password: "Abc123!".to_string(),
            communication_address: "456 Other Street Name".to_string(),
        }
    }

    fn initialized_slot(dir: &tempfile::TempDir) -> StoreSlot {
        let slot = StoreSlot::new();
        let response = initialize_in(&slot, &dir.path().join(DB_FILE_NAME));
        assert!(response.ok, "{}", response.message);
        slot
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn operations_before_initialize_report_not_initialized() {
        let slot = StoreSlot::new();

        let created = create_person_in(&slot, ann_form());
        assert!(!created.ok);
        assert_eq!(created.error_kind.as_deref(), Some("not_initialized"));

        let listed = list_people_in(&slot);
        assert!(!listed.ok);
        assert_eq!(listed.error_kind.as_deref(), Some("not_initialized"));

        let auth = authenticate_in(&slot, "9876543210", "Abc123!");
        assert!(!auth.ok);
        assert_eq!(auth.error_kind.as_deref(), Some("not_initialized"));

        let status = test_connection_in(&slot);
        assert_eq!(status.error_kind.as_deref(), Some("not_initialized"));
    }

    #[test]
    fn failed_initialize_leaves_slot_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let slot = initialized_slot(&dir);

        let bad_path = dir.path().join("missing-dir/nested/db.sqlite3");
        let response = initialize_in(&slot, &bad_path);
        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("storage"));

        let status = test_connection_in(&slot);
        assert_eq!(status.error_kind.as_deref(), Some("not_initialized"));
    }

    #[test]
    fn registration_login_edit_and_delete_flow() {
        let dir = tempfile::tempdir().unwrap();
        let slot = initialized_slot(&dir);

        assert!(test_connection_in(&slot).ok);

        let created = create_person_in(&slot, ann_form());
        assert!(created.ok, "{}", created.message);
        let id = created.person_id.expect("create should return person_id");

        let listed = list_people_in(&slot);
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].person.email, "ann@x.com");
        assert_eq!(
            listed.items[0].communication_address,
            "456 Other Street Name"
        );

        let auth = authenticate_in(&slot, "987-654-3210", "Abc123!");
        assert!(auth.ok);
        assert_eq!(auth.person.map(|person| person.id), Some(id));

        let edited = PersonForm {
            name: "Ann Marie".to_string(),
            ..ann_form()
        };
        let updated = update_person_in(&slot, id, edited);
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.affected, Some(1));
        assert_eq!(list_people_in(&slot).items[0].person.name, "Ann Marie");

        let deleted = delete_person_in(&slot, id);
        assert_eq!(deleted.affected, Some(1));

        let missing = delete_person_in(&slot, id);
        assert_eq!(missing.error_kind.as_deref(), Some("not_found"));
        assert!(list_people_in(&slot).items.is_empty());
    }

    #[test]
    fn validation_errors_name_the_failing_field() {
        let dir = tempfile::tempdir().unwrap();
        let slot = initialized_slot(&dir);

        let form = PersonForm {
            phone: "12345".to_string(),
            ..ann_form()
        };
        let response = create_person_in(&slot, form);
        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("validation"));
        assert_eq!(response.field.as_deref(), Some("phone"));
    }

    #[test]
    fn unknown_credentials_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let slot = initialized_slot(&dir);
        assert!(create_person_in(&slot, ann_form()).ok);

        let auth = authenticate_in(&slot, "9876543210", "Wrong12!");
        assert!(auth.ok);
        assert!(auth.person.is_none());
        assert!(auth.error_kind.is_none());
    }

    #[test]
    fn clear_all_data_empties_store() {
        let dir = tempfile::tempdir().unwrap();
        let slot = initialized_slot(&dir);
        assert!(create_person_in(&slot, ann_form()).ok);

        assert!(clear_all_data_in(&slot).ok);
        assert!(list_people_in(&slot).items.is_empty());
    }

    #[test]
    fn explicit_db_path_wins_over_fallbacks() {
        assert_eq!(
            resolve_db_path(Some(" /data/people.sqlite3 ".to_string())),
            PathBuf::from("/data/people.sqlite3")
        );
        assert!(!resolve_db_path(Some("   ".to_string()))
            .as_os_str()
            .is_empty());
    }
}
