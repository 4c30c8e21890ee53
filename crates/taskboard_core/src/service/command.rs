//! Discrete commands submitted by the interaction layer.
//!
//! One gesture maps to exactly one command; commands are decoded from JSON
//! with a `type` tag, e.g. `{"type":"toggle_completion","id":"42"}`.

use crate::model::task::{NewTask, Partition, Task, TaskId, TaskPatch};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskCommand {
    Create {
        task: NewTask,
    },
    Update {
        id: TaskId,
        patch: TaskPatch,
    },
    Delete {
        id: TaskId,
    },
    ToggleCompletion {
        id: TaskId,
    },
    MoveAcrossPartition {
        id: TaskId,
        target: Partition,
    },
    MoveAcrossPartitionOnto {
        id: TaskId,
        target: Partition,
        anchor_id: TaskId,
    },
    ReorderWithinPartition {
        partition: Partition,
        from_index: usize,
        to_index: usize,
    },
    ReindexPartition {
        partition: Partition,
        ordered_ids: Vec<TaskId>,
    },
    ReplaceAll {
        tasks: Vec<Task>,
    },
}

impl TaskCommand {
    /// Decodes one command payload.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Stable command name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::ToggleCompletion { .. } => "toggle_completion",
            Self::MoveAcrossPartition { .. } => "move_across_partition",
            Self::MoveAcrossPartitionOnto { .. } => "move_across_partition_onto",
            Self::ReorderWithinPartition { .. } => "reorder_within_partition",
            Self::ReindexPartition { .. } => "reindex_partition",
            Self::ReplaceAll { .. } => "replace_all",
        }
    }
}

/// Value produced by [`crate::TaskService::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Created, updated, toggled or moved task.
    Task(Task),
    /// Whether a delete removed something.
    Deleted(bool),
    /// Partition sequence after a reorder or reindex.
    Partition(Vec<Task>),
    Replaced,
}
