//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage and storage bootstrap from a shell.
//! - Print deterministic `key=value` lines for quick local checks.

use std::error::Error;
use std::process::ExitCode;
use taskboard_core::db::open_db;
use taskboard_core::{
    init_logging_from_config, SqliteKeyValueStore, TaskRepository, TaskService, TaskStore,
    TaskboardConfig,
};

fn main() -> ExitCode {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());

    match print_board_stats() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("taskboard error={err}");
            ExitCode::FAILURE
        }
    }
}

fn print_board_stats() -> Result<(), Box<dyn Error>> {
    let config = TaskboardConfig::from_env()?;
    init_logging_from_config(&config)?;

    let conn = open_db(&config.db_path)?;
    let backend = SqliteKeyValueStore::try_new(&conn)?;
    let (repo, report) = TaskRepository::open(TaskStore::with_key(backend, &config.storage_key));
    if let Some(warning) = &report.warning {
        log::warn!("event=cli_open module=cli status=degraded error={warning}");
        eprintln!("taskboard warning={warning}");
    }

    let service = TaskService::new(repo);
    let stats = service.stats();
    println!("db_path={}", config.db_path.display());
    println!("seeded={}", report.seeded);
    println!(
        "total={} pending={} completed={} overdue={}",
        stats.total, stats.pending, stats.completed, stats.overdue
    );
    Ok(())
}
