//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own every SQL statement touching `personal_details` and
//!   `communication_addresses`.
//! - Run create/update as one transaction spanning both tables.
//! - Produce denormalized list rows and credential lookups.
//!
//! # Invariants
//! - Write paths only accept `ValidatedPerson` / `ValidatedAddress`.
//! - Every multi-statement write commits as a whole or rolls back as a whole;
//!   the transaction guard rolls back on any early return.
//! - A person created here always has exactly one address row; updates reuse
//!   it instead of inserting a second one.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::schema::{
    table_exists, table_has_column, ADDRESS_COLUMNS, ADDRESS_TABLE, PERSON_COLUMNS, PERSON_TABLE,
};
use crate::db::DbError;
use crate::model::person::{PersonId, PersonListing, PersonView, ValidatedAddress, ValidatedPerson};
use crate::model::validation::{ValidationError, AGE_MAX, AGE_MIN};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PERSON_LISTING_SQL: &str = "SELECT
    pd.id,
    pd.name,
    pd.email,
    pd.phone,
    pd.age,
    pd.permanent_address,
    pd.created_at,
    pd.updated_at,
    ca.communication_address
FROM personal_details pd
LEFT JOIN communication_addresses ca ON ca.person_id = pd.id
ORDER BY pd.created_at DESC, pd.id DESC;";

const CREDENTIAL_LOOKUP_SQL: &str = "SELECT
    id,
    name,
    email,
    phone,
    age,
    permanent_address
FROM personal_details
WHERE phone = ?1 AND password = ?2
ORDER BY id ASC
LIMIT 1;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected by the field validator.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No `personal_details` row with this id.
    NotFound(PersonId),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "no record found with id {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "person repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "person repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for person CRUD, listing and credential lookup.
pub trait PersonRepository {
    /// Inserts person + address atomically and returns the new person id.
    fn create_person(
        &mut self,
        person: &ValidatedPerson,
        address: &ValidatedAddress,
    ) -> RepoResult<PersonId>;
    /// Replaces person fields and upserts its address atomically.
    ///
    /// Returns the number of person rows updated (always 1 on success).
    fn update_person(
        &mut self,
        id: PersonId,
        person: &ValidatedPerson,
        address: &ValidatedAddress,
    ) -> RepoResult<usize>;
    /// Deletes a person; its address goes with it through the FK cascade.
    fn delete_person(&mut self, id: PersonId) -> RepoResult<usize>;
    /// Removes every address and person row in one transaction.
    fn clear_all(&mut self) -> RepoResult<()>;
    /// Lists all persons joined with their address, newest first.
    fn list_people(&self) -> RepoResult<Vec<PersonListing>>;
    /// Exact phone + password match; lowest id wins on duplicates.
    fn find_by_credentials(&self, phone: &str, password: &str) -> RepoResult<Option<PersonView>>;
    /// Issues a trivial query to confirm the connection is usable.
    fn ping(&self) -> RepoResult<bool>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from an opened connection with both tables present.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_person_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn immediate_transaction(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

/// Owned connection that has passed the person-table readiness checks.
///
/// Long-lived holders check once here and then borrow repositories
/// through [`PersonStore::repository`] without repeating the checks.
pub struct PersonStore {
    conn: Connection,
}

impl PersonStore {
    /// Takes ownership of an opened connection with both tables present.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_person_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    pub fn repository(&mut self) -> SqlitePersonRepository<'_> {
        SqlitePersonRepository {
            conn: &mut self.conn,
        }
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(
        &mut self,
        person: &ValidatedPerson,
        address: &ValidatedAddress,
    ) -> RepoResult<PersonId> {
        let tx = self.immediate_transaction()?;

        tx.execute(
            "INSERT INTO personal_details (
                name,
                email,
                phone,
                age,
                permanent_address,
                password
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                person.name(),
                person.email(),
                person.phone(),
                person.age(),
                person.permanent_address(),
                person.password(),
            ],
        )?;
        let person_id = tx.last_insert_rowid();

        insert_address(&tx, person_id, address)?;

        tx.commit()?;
        Ok(person_id)
    }

    fn update_person(
        &mut self,
        id: PersonId,
        person: &ValidatedPerson,
        address: &ValidatedAddress,
    ) -> RepoResult<usize> {
        let tx = self.immediate_transaction()?;

        let changed = tx.execute(
            "UPDATE personal_details
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                age = ?4,
                permanent_address = ?5,
                password = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                person.name(),
                person.email(),
                person.phone(),
                person.age(),
                person.permanent_address(),
                person.password(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let existing_address: Option<i64> = tx
            .query_row(
                "SELECT id FROM communication_addresses WHERE person_id = ?1 ORDER BY id ASC LIMIT 1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match existing_address {
            Some(_) => {
                tx.execute(
                    "UPDATE communication_addresses
                     SET
                        communication_address = ?1,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE person_id = ?2;",
                    params![address.communication_address(), id],
                )?;
            }
            None => insert_address(&tx, id, address)?,
        }

        tx.commit()?;
        Ok(changed)
    }

    fn delete_person(&mut self, id: PersonId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM personal_details WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(changed)
    }

    fn clear_all(&mut self) -> RepoResult<()> {
        let tx = self.immediate_transaction()?;
        tx.execute("DELETE FROM communication_addresses;", [])?;
        tx.execute("DELETE FROM personal_details;", [])?;
        tx.commit()?;
        Ok(())
    }

    fn list_people(&self) -> RepoResult<Vec<PersonListing>> {
        let mut stmt = self.conn.prepare(PERSON_LISTING_SQL)?;
        let mut rows = stmt.query([])?;
        let mut people = Vec::new();

        while let Some(row) = rows.next()? {
            people.push(PersonListing {
                person: parse_person_view(row)?,
                communication_address: row.get("communication_address")?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            });
        }

        Ok(people)
    }

    fn find_by_credentials(&self, phone: &str, password: &str) -> RepoResult<Option<PersonView>> {
        let mut stmt = self.conn.prepare(CREDENTIAL_LOOKUP_SQL)?;
        let mut rows = stmt.query(params![phone, password])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_view(row)?));
        }

        Ok(None)
    }

    fn ping(&self) -> RepoResult<bool> {
        let value: i64 = self
            .conn
            .query_row("SELECT 1 AS test;", [], |row| row.get(0))?;
        Ok(value == 1)
    }
}

fn insert_address(
    tx: &Transaction<'_>,
    person_id: PersonId,
    address: &ValidatedAddress,
) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO communication_addresses (person_id, communication_address)
         VALUES (?1, ?2);",
        params![person_id, address.communication_address()],
    )?;
    Ok(())
}

fn parse_person_view(row: &Row<'_>) -> RepoResult<PersonView> {
    let id: PersonId = row.get("id")?;
    let raw_age: i64 = row.get("age")?;
    let age = u8::try_from(raw_age)
        .ok()
        .filter(|age| (AGE_MIN..=AGE_MAX).contains(age))
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid age `{raw_age}` in personal_details.age for id {id}"
            ))
        })?;

    Ok(PersonView {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        age,
        permanent_address: row.get("permanent_address")?,
    })
}

fn ensure_person_connection_ready(conn: &Connection) -> RepoResult<()> {
    for (table, columns) in [
        (PERSON_TABLE, PERSON_COLUMNS),
        (ADDRESS_TABLE, ADDRESS_COLUMNS),
    ] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}
