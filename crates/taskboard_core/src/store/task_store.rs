//! Task collection codec over a key-value backend.
//!
//! # Responsibility
//! - Load the full task collection, degrading unreadable state to empty.
//! - Save the full collection, overwriting prior state unconditionally.
//!
//! # Invariants
//! - `load` never returns an error; problems surface as `LoadedTasks::warning`.
//! - `save` never mutates caller-held tasks.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::model::task::Task;
use log::{error, info, warn};
use std::collections::HashSet;

/// Default key of the collection record.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// No record exists under the key (first use).
    Missing,
    /// A readable record was decoded.
    Stored,
    /// A record exists but could not be decoded.
    Corrupt,
    /// The backend could not be read.
    Unreadable,
}

/// Result of [`TaskStore::load`].
#[derive(Debug)]
pub struct LoadedTasks {
    /// Tasks in stored sequence; empty unless `source == Stored`.
    pub tasks: Vec<Task>,
    pub source: LoadSource,
    /// Recoverable condition hit while loading, if any.
    pub warning: Option<StoreError>,
}

/// Persists a task collection as a single JSON record.
pub struct TaskStore<S: KeyValueStore> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Creates a store using [`DEFAULT_STORAGE_KEY`].
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads the stored collection.
    pub fn load(&self) -> LoadedTasks {
        let payload = match self.backend.get(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("event=store_load module=store status=ok source=missing count=0");
                return LoadedTasks {
                    tasks: Vec::new(),
                    source: LoadSource::Missing,
                    warning: None,
                };
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error error_code=store_read_failed error={err}"
                );
                return LoadedTasks {
                    tasks: Vec::new(),
                    source: LoadSource::Unreadable,
                    warning: Some(err),
                };
            }
        };

        match decode_tasks(&self.key, &payload) {
            Ok(tasks) => {
                info!(
                    "event=store_load module=store status=ok source=stored count={}",
                    tasks.len()
                );
                LoadedTasks {
                    tasks,
                    source: LoadSource::Stored,
                    warning: None,
                }
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error error_code=store_payload_corrupt payload_bytes={} error={err}",
                    payload.len()
                );
                LoadedTasks {
                    tasks: Vec::new(),
                    source: LoadSource::Corrupt,
                    warning: Some(err),
                }
            }
        }
    }

    /// Overwrites the stored collection with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let result = encode_tasks(tasks).and_then(|payload| self.backend.set(&self.key, &payload));
        match &result {
            Ok(()) => info!(
                "event=store_save module=store status=ok count={}",
                tasks.len()
            ),
            Err(err) => error!(
                "event=store_save module=store status=error error_code=store_write_failed count={} error={err}",
                tasks.len()
            ),
        }
        result
    }
}

/// Serializes a collection into the persisted JSON layout.
pub fn encode_tasks(tasks: &[Task]) -> StoreResult<String> {
    serde_json::to_string(tasks).map_err(|err| StoreError::Encode(err.to_string()))
}

/// Parses a persisted payload, rejecting invalid records and duplicate ids.
pub fn decode_tasks(key: &str, payload: &str) -> StoreResult<Vec<Task>> {
    let corrupt = |message: String| StoreError::Corrupt {
        key: key.to_string(),
        message,
    };

    let tasks: Vec<Task> = serde_json::from_str(payload).map_err(|err| corrupt(err.to_string()))?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        task.validate().map_err(|err| corrupt(err.to_string()))?;
        if !seen.insert(task.id.as_str()) {
            return Err(corrupt(format!("duplicate task id: {}", task.id)));
        }
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::{decode_tasks, encode_tasks, LoadSource, TaskStore};
    use crate::model::task::{Priority, Task};
    use crate::store::{MemoryKeyValueStore, StoreError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn optional_fields_are_omitted_not_null() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let mut task = Task::sample(now);
        task.description = None;
        task.category = None;

        let payload = encode_tasks(&[task]).unwrap();
        assert!(!payload.contains("null"));
        assert!(!payload.contains("description"));
        assert!(!payload.contains("dueDate"));
        assert!(payload.contains("\"createdAt\":\"2024-05-01T08:30:00Z\""));
        assert!(payload.contains("\"priority\":\"high\""));
    }

    #[test]
    fn decodes_payload_with_millisecond_timestamps() {
        let payload = r#"[{
            "id": "5a1d",
            "title": "Write report",
            "completed": false,
            "createdAt": "2024-05-01T08:30:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.123Z",
            "priority": "medium",
            "dueDate": "2024-05-03T00:00:00.000Z",
            "order": 1717171717
        }]"#;
        let tasks = decode_tasks("todos", payload).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert_eq!(tasks[0].category, None);
        assert_eq!(
            tasks[0].due_date,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(tasks[0].order, 1_717_171_717);
    }

    #[test]
    fn duplicate_ids_are_corrupt() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let payload = encode_tasks(&[Task::sample(now), Task::sample(now)]).unwrap();
        let err = decode_tasks("todos", &payload).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn unparsable_payload_degrades_to_empty() {
        let store = TaskStore::new(MemoryKeyValueStore::with_entry("todos", "{not json"));
        let loaded = store.load();
        assert!(loaded.tasks.is_empty());
        assert_eq!(loaded.source, LoadSource::Corrupt);
        assert!(matches!(loaded.warning, Some(StoreError::Corrupt { .. })));
    }
}
