//! SQLite file backing the task store.
//!
//! # Responsibility
//! - Open task database connections ready for key-value access.
//! - Keep the `kv_entries` schema current.
//!
//! # Invariants
//! - A connection is only returned after its schema is at the latest version.
//! - Files written by a newer build are refused rather than downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Task database failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Parent directory of the database file could not be created.
    CreateDir(std::io::Error),
    /// File schema is ahead of this build.
    NewerSchema { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "task database error: {err}"),
            Self::CreateDir(err) => write!(f, "cannot create task database directory: {err}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "task database uses schema {found} but this build only understands up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDir(err) => Some(err),
            Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
