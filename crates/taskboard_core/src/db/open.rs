//! Task database connections.
//!
//! Every connection handed out here is migrated to [`latest_version`] and
//! ready for [`crate::store::SqliteKeyValueStore`]. Log lines carry the
//! backing (`file` or `memory`), elapsed time and resulting schema version;
//! paths are never logged.

use super::migrations::{apply_migrations, latest_version, schema_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum Backing {
    File,
    Memory,
}

impl Backing {
    fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens the task database at `path`, creating the file and its parent
/// directory on first use.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| {
            error!(
                "event=task_db_open module=db status=error backing=file error_code=task_db_dir_failed error={err}"
            );
            DbError::CreateDir(err)
        })?;
    }
    connect(Backing::File, || Connection::open(path))
}

/// Opens a throwaway task database that lives as long as the connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    connect(Backing::Memory, Connection::open_in_memory)
}

fn connect(
    backing: Backing,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let elapsed_ms = || started_at.elapsed().as_millis();

    let mut conn = open().map_err(|err| {
        error!(
            "event=task_db_open module=db status=error backing={} duration_ms={} error_code=task_db_open_failed error={err}",
            backing.as_str(),
            elapsed_ms()
        );
        DbError::from(err)
    })?;

    if let Err(err) = prepare(&mut conn) {
        error!(
            "event=task_db_open module=db status=error backing={} duration_ms={} error_code=task_db_schema_failed error={err}",
            backing.as_str(),
            elapsed_ms()
        );
        return Err(err);
    }

    info!(
        "event=task_db_open module=db status=ok backing={} duration_ms={} schema_version={}",
        backing.as_str(),
        elapsed_ms(),
        latest_version()
    );
    Ok(conn)
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let before = schema_version(conn)?;
    apply_migrations(conn)?;
    if before != latest_version() {
        info!(
            "event=task_db_upgrade module=db status=ok from_version={before} to_version={}",
            latest_version()
        );
    }
    Ok(())
}
