//! In-memory task repository with write-through persistence.
//!
//! # Responsibility
//! - Own the authoritative task collection for a session.
//! - Apply create/update/delete/toggle/replace commands atomically.
//! - Forward the full collection to the store after every mutation.
//!
//! # Invariants
//! - Validation and lookup failures are returned before anything changes.
//! - A failed write never rolls back memory; the repository stays dirty and
//!   the next mutation (or [`TaskRepository::flush`]) rewrites everything.
//! - New and toggled tasks land last in their partition.

use crate::model::task::{NewTask, Partition, Task, TaskId, TaskPatch, TaskValidationError};
use crate::ordering::next_order;
use crate::store::{KeyValueStore, LoadSource, StoreError, TaskStore};
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for rejected commands.
#[derive(Debug)]
pub enum RepoError {
    /// Command referenced an unknown id.
    NotFound(TaskId),
    /// Input failed field validation.
    Validation(TaskValidationError),
    /// Explicit flush could not reach the store.
    Persistence(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Outcome of a mutation that has been applied in memory.
///
/// `persist_error` is set when the durable write failed; the value is still
/// the new source of truth for this session.
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    pub value: T,
    pub persist_error: Option<StoreError>,
}

impl<T> Committed<T> {
    fn new(value: T, persist_error: Option<StoreError>) -> Self {
        Self {
            value,
            persist_error,
        }
    }

    /// Returns whether the change reached the store.
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            persist_error: self.persist_error,
        }
    }
}

/// What happened while opening a repository.
#[derive(Debug)]
pub struct OpenReport {
    pub source: LoadSource,
    /// Whether the bootstrap sample task was written.
    pub seeded: bool,
    /// Recoverable load or seed-write failure.
    pub warning: Option<StoreError>,
}

/// Authoritative task collection bound to one store.
pub struct TaskRepository<S: KeyValueStore> {
    tasks: Vec<Task>,
    store: TaskStore<S>,
    dirty: bool,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Loads the collection from `store`, seeding a sample task on first use.
    ///
    /// Seeding only happens when no record exists yet; a stored empty list
    /// stays empty.
    pub fn open(store: TaskStore<S>) -> (Self, OpenReport) {
        let loaded = store.load();
        let mut repo = Self {
            tasks: loaded.tasks,
            store,
            dirty: false,
        };
        let mut report = OpenReport {
            source: loaded.source,
            seeded: false,
            warning: loaded.warning,
        };

        if loaded.source == LoadSource::Missing {
            repo.tasks.push(Task::sample(Utc::now()));
            report.seeded = true;
            if let Some(err) = repo.persist() {
                report.warning = Some(err);
            }
            info!("event=task_seed module=repo status=ok count=1");
        }

        (repo, report)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns whether memory holds changes the store has not accepted yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Creates a pending task placed after every current pending task.
    pub fn create(&mut self, input: NewTask) -> RepoResult<Committed<Task>> {
        input.validate()?;

        let order = next_order(&self.tasks, Partition::Pending);
        let task = Task::from_new(input, order, Utc::now());
        self.tasks.push(task.clone());
        info!(
            "event=task_create module=repo status=ok task_id={} order={}",
            task.id, task.order
        );

        let persist_error = self.persist();
        Ok(Committed::new(task, persist_error))
    }

    /// Merges `patch` over the task with `id`.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> RepoResult<Committed<Task>> {
        patch.validate()?;
        let index = self.index_of(id)?;

        let task = &mut self.tasks[index];
        patch.apply_to(task);
        task.touch(Utc::now());
        let updated = task.clone();
        info!("event=task_update module=repo status=ok task_id={id}");

        let persist_error = self.persist();
        Ok(Committed::new(updated, persist_error))
    }

    /// Removes the task with `id`. Returns `false` without writing when absent.
    pub fn delete(&mut self, id: &str) -> Committed<bool> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return Committed::new(false, None);
        };

        self.tasks.remove(index);
        info!("event=task_delete module=repo status=ok task_id={id}");
        let persist_error = self.persist();
        Committed::new(true, persist_error)
    }

    /// Flips completion and appends the task to the end of its new partition.
    pub fn toggle_completion(&mut self, id: &str) -> RepoResult<Committed<Task>> {
        let index = self.index_of(id)?;

        let target = self.tasks[index].partition().opposite();
        let order = next_order(&self.tasks, target);
        let task = &mut self.tasks[index];
        task.completed = target.is_completed();
        task.order = order;
        task.touch(Utc::now());
        let toggled = task.clone();
        info!(
            "event=task_toggle module=repo status=ok task_id={id} partition={target} order={order}"
        );

        let persist_error = self.persist();
        Ok(Committed::new(toggled, persist_error))
    }

    /// Replaces the whole collection.
    ///
    /// Only record shape is checked (field validity, unique ids); ordering
    /// invariants are the caller's responsibility.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> RepoResult<Committed<()>> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            task.validate()?;
            if !seen.insert(task.id.as_str()) {
                return Err(TaskValidationError::DuplicateId(task.id.clone()).into());
            }
        }

        self.tasks = tasks;
        info!(
            "event=task_replace_all module=repo status=ok count={}",
            self.tasks.len()
        );
        let persist_error = self.persist();
        Ok(Committed::new((), persist_error))
    }

    /// Retries a previously failed write. No-op when nothing is pending.
    pub fn flush(&mut self) -> RepoResult<()> {
        if !self.dirty {
            return Ok(());
        }
        match self.persist() {
            None => Ok(()),
            Some(err) => Err(RepoError::Persistence(err)),
        }
    }

    fn index_of(&self, id: &str) -> RepoResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    fn persist(&mut self) -> Option<StoreError> {
        match self.store.save(&self.tasks) {
            Ok(()) => {
                self.dirty = false;
                None
            }
            Err(err) => {
                self.dirty = true;
                warn!(
                    "event=task_persist module=repo status=error error_code=persist_deferred count={}",
                    self.tasks.len()
                );
                Some(err)
            }
        }
    }
}
