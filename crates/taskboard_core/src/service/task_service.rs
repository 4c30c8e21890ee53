//! Task board use-case service.
//!
//! # Responsibility
//! - Expose the full command surface to the interaction layer.
//! - Run ordering-engine results through `replace_all` so every move is one
//!   atomic, persisted collection change.
//! - Serve read-only projections.
//!
//! # Invariants
//! - Commands run to completion (including issuing the write) before the
//!   next one starts; `&mut self` enforces a single writer.
//! - No-op moves do not write.

use crate::model::task::{NewTask, Partition, Task, TaskId, TaskPatch, TaskValidationError};
use crate::ordering::{self, OrderPatch, OrderingError};
use crate::repo::task_repo::{Committed, RepoError, TaskRepository};
use crate::service::command::{CommandOutput, TaskCommand};
use crate::store::{KeyValueStore, StoreError};
use crate::view::{self, TaskFilter, TaskStats};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskResult<T> = Result<T, TaskServiceError>;

/// Command-boundary error.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Command referenced an unknown id.
    NotFound(TaskId),
    /// Input failed validation (blank title, malformed patch, bad anchor).
    Validation(TaskValidationError),
    /// Reindex payload does not match the partition's members.
    InconsistentSet {
        partition: Partition,
        missing: Vec<TaskId>,
        unexpected: Vec<TaskId>,
    },
    /// Reorder index outside the partition.
    IndexOutOfRange {
        partition: Partition,
        index: usize,
        len: usize,
    },
    /// Store write failed on an explicit flush.
    Persistence(StoreError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InconsistentSet {
                partition,
                missing,
                unexpected,
            } => write!(
                f,
                "reindex ids do not match the {partition} partition: missing [{}], unexpected [{}]",
                missing.join(", "),
                unexpected.join(", ")
            ),
            Self::IndexOutOfRange {
                partition,
                index,
                len,
            } => write!(
                f,
                "index {index} is out of range for the {partition} partition of {len} tasks"
            ),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Persistence(err) => Self::Persistence(err),
        }
    }
}

impl From<OrderingError> for TaskServiceError {
    fn from(value: OrderingError) -> Self {
        match value {
            OrderingError::TaskNotFound(id) => Self::NotFound(id),
            OrderingError::AnchorNotInPartition {
                anchor_id,
                partition,
            } => Self::Validation(TaskValidationError::InvalidDropTarget {
                anchor_id,
                partition,
            }),
            OrderingError::InconsistentSet {
                partition,
                missing,
                unexpected,
            } => Self::InconsistentSet {
                partition,
                missing,
                unexpected,
            },
            OrderingError::IndexOutOfRange {
                partition,
                index,
                len,
            } => Self::IndexOutOfRange {
                partition,
                index,
                len,
            },
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Task board facade over one repository.
pub struct TaskService<S: KeyValueStore> {
    repo: TaskRepository<S>,
}

impl<S: KeyValueStore> TaskService<S> {
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn into_repository(self) -> TaskRepository<S> {
        self.repo
    }

    pub fn create(&mut self, input: NewTask) -> TaskResult<Committed<Task>> {
        Ok(self.repo.create(input)?)
    }

    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> TaskResult<Committed<Task>> {
        Ok(self.repo.update(id, patch)?)
    }

    pub fn delete(&mut self, id: &str) -> Committed<bool> {
        self.repo.delete(id)
    }

    pub fn toggle_completion(&mut self, id: &str) -> TaskResult<Committed<Task>> {
        Ok(self.repo.toggle_completion(id)?)
    }

    /// Drops a task on a partition column; it appends to the end.
    pub fn move_across_partition(
        &mut self,
        id: &str,
        target: Partition,
    ) -> TaskResult<Committed<Task>> {
        let patches = ordering::move_across_partition(self.repo.tasks(), id, target)?;
        let persist_error = self.commit_patches(&patches)?;
        Ok(Committed {
            value: self.required(id)?,
            persist_error,
        })
    }

    /// Drops a task onto another task of `target`; it lands right before it.
    pub fn move_across_partition_onto(
        &mut self,
        id: &str,
        target: Partition,
        anchor_id: &str,
    ) -> TaskResult<Committed<Task>> {
        let patches =
            ordering::move_across_partition_onto(self.repo.tasks(), id, target, anchor_id)?;
        let persist_error = self.commit_patches(&patches)?;
        Ok(Committed {
            value: self.required(id)?,
            persist_error,
        })
    }

    /// Splices the task at `from_index` to `to_index` inside `partition`.
    pub fn reorder_within_partition(
        &mut self,
        partition: Partition,
        from_index: usize,
        to_index: usize,
    ) -> TaskResult<Committed<Vec<Task>>> {
        let patches =
            ordering::reorder_within_partition(self.repo.tasks(), partition, from_index, to_index)?;
        let persist_error = self.commit_patches(&patches)?;
        Ok(Committed {
            value: self.partition_snapshot(partition),
            persist_error,
        })
    }

    /// Rewrites `partition` ranks to follow `ordered_ids`.
    pub fn reindex_partition(
        &mut self,
        partition: Partition,
        ordered_ids: &[TaskId],
    ) -> TaskResult<Committed<Vec<Task>>> {
        let patches = ordering::reindex_partition(self.repo.tasks(), partition, ordered_ids)?;
        let persist_error = self.commit_patches(&patches)?;
        Ok(Committed {
            value: self.partition_snapshot(partition),
            persist_error,
        })
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) -> TaskResult<Committed<()>> {
        Ok(self.repo.replace_all(tasks)?)
    }

    /// Applies one decoded command.
    pub fn execute(&mut self, command: TaskCommand) -> TaskResult<Committed<CommandOutput>> {
        let name = command.name();
        let result = match command {
            TaskCommand::Create { task } => self.create(task).map(|c| c.map(CommandOutput::Task)),
            TaskCommand::Update { id, patch } => self
                .update(&id, &patch)
                .map(|c| c.map(CommandOutput::Task)),
            TaskCommand::Delete { id } => Ok(self.delete(&id).map(CommandOutput::Deleted)),
            TaskCommand::ToggleCompletion { id } => self
                .toggle_completion(&id)
                .map(|c| c.map(CommandOutput::Task)),
            TaskCommand::MoveAcrossPartition { id, target } => self
                .move_across_partition(&id, target)
                .map(|c| c.map(CommandOutput::Task)),
            TaskCommand::MoveAcrossPartitionOnto {
                id,
                target,
                anchor_id,
            } => self
                .move_across_partition_onto(&id, target, &anchor_id)
                .map(|c| c.map(CommandOutput::Task)),
            TaskCommand::ReorderWithinPartition {
                partition,
                from_index,
                to_index,
            } => self
                .reorder_within_partition(partition, from_index, to_index)
                .map(|c| c.map(CommandOutput::Partition)),
            TaskCommand::ReindexPartition {
                partition,
                ordered_ids,
            } => self
                .reindex_partition(partition, &ordered_ids)
                .map(|c| c.map(CommandOutput::Partition)),
            TaskCommand::ReplaceAll { tasks } => self
                .replace_all(tasks)
                .map(|c| c.map(|()| CommandOutput::Replaced)),
        };

        match &result {
            Ok(committed) if committed.is_durable() => {
                info!("event=command module=service status=ok command={name}")
            }
            Ok(_) => warn!("event=command module=service status=ok command={name} durable=false"),
            Err(err) => {
                warn!("event=command module=service status=rejected command={name} error={err}")
            }
        }
        result
    }

    /// Retries a deferred write.
    pub fn flush(&mut self) -> TaskResult<()> {
        Ok(self.repo.flush()?)
    }

    pub fn pending(&self) -> Vec<&Task> {
        view::pending(self.repo.tasks())
    }

    pub fn completed(&self) -> Vec<&Task> {
        view::completed(self.repo.tasks())
    }

    pub fn all(&self) -> Vec<&Task> {
        view::all(self.repo.tasks())
    }

    /// Board counters evaluated against the current wall clock.
    pub fn stats(&self) -> TaskStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> TaskStats {
        view::stats(self.repo.tasks(), now)
    }

    /// Text search over the whole board in display order.
    pub fn filter(&self, query: &str) -> Vec<&Task> {
        view::filter(&self.all(), query)
    }

    /// Text search narrowed by status/priority/category.
    pub fn search(&self, query: &str, task_filter: &TaskFilter) -> Vec<&Task> {
        view::apply_filter(&self.filter(query), task_filter)
    }

    fn commit_patches(&mut self, patches: &[OrderPatch]) -> TaskResult<Option<StoreError>> {
        if patches.is_empty() {
            return Ok(None);
        }
        let next = ordering::apply_patches(self.repo.tasks(), patches, Utc::now())?;
        let committed = self.repo.replace_all(next)?;
        Ok(committed.persist_error)
    }

    fn required(&self, id: &str) -> TaskResult<Task> {
        self.repo
            .get(id)
            .cloned()
            .ok_or_else(|| TaskServiceError::NotFound(id.to_string()))
    }

    fn partition_snapshot(&self, partition: Partition) -> Vec<Task> {
        ordering::sorted_partition(self.repo.tasks(), partition)
            .into_iter()
            .cloned()
            .collect()
    }
}
