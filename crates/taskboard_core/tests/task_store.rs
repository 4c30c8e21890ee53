use chrono::{TimeZone, Utc};
use taskboard_core::db::{open_db, open_db_in_memory};
use taskboard_core::{
    KeyValueStore, LoadSource, MemoryKeyValueStore, Priority, SqliteKeyValueStore, StoreError,
    Task, TaskStore,
};

fn fixture_tasks() -> Vec<Task> {
    let created = Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap();
    let mut first = Task::sample(created);
    first.id = "a".to_string();

    let mut second = Task::sample(created);
    second.id = "b".to_string();
    second.title = "Pay rent".to_string();
    second.description = None;
    second.category = None;
    second.completed = true;
    second.priority = Priority::Medium;
    second.updated_at = Utc.with_ymd_and_hms(2024, 2, 11, 9, 15, 30).unwrap()
        + chrono::Duration::milliseconds(250);
    second.due_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    second.order = -3;

    vec![first, second]
}

#[test]
fn save_then_load_round_trips_including_dates() {
    let conn = open_db_in_memory().unwrap();
    let store = TaskStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let tasks = fixture_tasks();

    store.save(&tasks).unwrap();
    let loaded = store.load();

    assert_eq!(loaded.source, LoadSource::Stored);
    assert!(loaded.warning.is_none());
    assert_eq!(loaded.tasks, tasks);
}

#[test]
fn round_trip_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let tasks = fixture_tasks();

    {
        let conn = open_db(&path).unwrap();
        let store = TaskStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
        store.save(&tasks).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = TaskStore::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    assert_eq!(store.load().tasks, tasks);
}

#[test]
fn save_overwrites_previous_collection() {
    let store = TaskStore::new(MemoryKeyValueStore::new());
    let tasks = fixture_tasks();

    store.save(&tasks).unwrap();
    store.save(&tasks[..1]).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.tasks.len(), 1);
    assert_eq!(loaded.tasks[0].id, "a");
}

#[test]
fn missing_record_loads_empty_without_warning() {
    let store = TaskStore::new(MemoryKeyValueStore::new());
    let loaded = store.load();

    assert!(loaded.tasks.is_empty());
    assert_eq!(loaded.source, LoadSource::Missing);
    assert!(loaded.warning.is_none());
}

#[test]
fn invalid_records_degrade_to_empty_with_warning() {
    let payload = r#"[{"id":"a","title":"   ","completed":false,
        "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z",
        "priority":"low","order":0}]"#;
    let store = TaskStore::new(MemoryKeyValueStore::with_entry("todos", payload));

    let loaded = store.load();
    assert!(loaded.tasks.is_empty());
    assert_eq!(loaded.source, LoadSource::Corrupt);
    assert!(matches!(loaded.warning, Some(StoreError::Corrupt { .. })));
}

#[test]
fn custom_key_is_isolated_from_default_key() {
    let backend = MemoryKeyValueStore::new();
    let store = TaskStore::with_key(backend.clone(), "board.work");

    store.save(&fixture_tasks()).unwrap();

    assert!(backend.get("todos").unwrap().is_none());
    assert!(backend.get("board.work").unwrap().is_some());
    assert_eq!(store.key(), "board.work");
}
