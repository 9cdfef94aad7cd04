//! SQLite storage bootstrap and schema lifecycle entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for profilebook core.
//! - Bring every opened store to a known-good, empty schema.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Opening a store always drops and recreates both tables; data does not
//!   survive a reopen.
//! - Core code must not read/write person data before the reset succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// No store has been opened yet, or the last open attempt failed.
    NotInitialized,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NotInitialized => write!(f, "database not initialized"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NotInitialized => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
