//! SQLite-backed key-value store.
//!
//! # Invariants
//! - The connection must be migrated (see [`crate::db::open_db`]).
//! - `set` is an upsert on `kv_entries.key`.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::db::migrations::{latest_version, schema_version};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store over the `kv_entries` table.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value
                 FROM kv_entries
                 WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    if schema_version(conn)? != latest_version() {
        return Err(StoreError::Uninitialized(
            "connection schema version does not match; open it with open_db",
        ));
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'kv_entries'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::Uninitialized("missing table `kv_entries`"));
    }
    Ok(())
}
