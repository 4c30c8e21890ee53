//! Persistent store adapter.
//!
//! # Responsibility
//! - Provide durable key-value persistence behind the [`KeyValueStore`] seam.
//! - Encode/decode the whole task collection as one JSON record.
//!
//! # Invariants
//! - Writes replace the record wholesale; there are no partial or merge writes.
//! - Decode failures degrade to an empty collection and never raise.
//! - No ordering logic lives here.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_kv;
pub mod sqlite_kv;
pub mod task_store;

pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;
pub use task_store::{LoadSource, LoadedTasks, TaskStore, DEFAULT_STORAGE_KEY};

pub type StoreResult<T> = Result<T, StoreError>;

/// Recoverable persistence failures.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite/bootstrap failure.
    Db(DbError),
    /// Connection is not migrated to the schema this store expects.
    Uninitialized(&'static str),
    /// Collection could not be serialized.
    Encode(String),
    /// Stored payload could not be decoded into a valid collection.
    Corrupt { key: String, message: String },
    /// Backend refused the operation (quota exceeded, read-only medium, ...).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Uninitialized(details) => write!(f, "task store is not initialized: {details}"),
            Self::Encode(message) => write!(f, "failed to encode tasks: {message}"),
            Self::Corrupt { key, message } => {
                write!(f, "stored tasks under `{key}` are unreadable: {message}")
            }
            Self::Unavailable(message) => write!(f, "task store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string key-value backend.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}
