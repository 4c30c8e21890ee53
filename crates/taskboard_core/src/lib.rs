//! Core domain logic for the task board.
//! This crate is the single source of truth for task ordering invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use config::{ConfigError, TaskboardConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{
    NewTask, Partition, Priority, Task, TaskId, TaskPatch, TaskValidationError, DEFAULT_CATEGORY,
};
pub use ordering::{OrderPatch, OrderingError};
pub use repo::task_repo::{Committed, OpenReport, RepoError, RepoResult, TaskRepository};
pub use service::command::{CommandOutput, TaskCommand};
pub use service::task_service::{TaskResult, TaskService, TaskServiceError};
pub use store::{
    KeyValueStore, LoadSource, LoadedTasks, MemoryKeyValueStore, SqliteKeyValueStore, StoreError,
    StoreResult, TaskStore, DEFAULT_STORAGE_KEY,
};
pub use view::{StatusFilter, TaskFilter, TaskStats};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
