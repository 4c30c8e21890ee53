//! Ordering engine.
//!
//! # Responsibility
//! - Compute `order`/`completed` changes for moves, transfers and reindexing.
//! - Stay pure: functions read a collection slice and return patches; they
//!   never touch the store.
//!
//! # Invariants
//! - Partition rank is derived from a stable sort on `order`, so equal orders
//!   keep collection position.
//! - Reindexed partitions come out as `0..n-1` in output sequence.

use crate::model::task::{Partition, Task, TaskId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod engine;

pub use engine::{
    move_across_partition, move_across_partition_onto, reindex_partition,
    reorder_within_partition,
};

pub type OrderingResult<T> = Result<T, OrderingError>;

/// Rejected ordering requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// Moved task or drop anchor does not exist.
    TaskNotFound(TaskId),
    /// Drop anchor exists but sits in the other partition.
    AnchorNotInPartition {
        anchor_id: TaskId,
        partition: Partition,
    },
    /// Reindex ids are not exactly the partition's members.
    InconsistentSet {
        partition: Partition,
        missing: Vec<TaskId>,
        unexpected: Vec<TaskId>,
    },
    /// Splice index outside the partition.
    IndexOutOfRange {
        partition: Partition,
        index: usize,
        len: usize,
    },
}

impl Display for OrderingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::AnchorNotInPartition {
                anchor_id,
                partition,
            } => write!(f, "drop target {anchor_id} is not in the {partition} partition"),
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
        }
    }
}

impl Error for OrderingError {}

/// Change to one task's partition membership and rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPatch {
    pub id: TaskId,
    pub completed: bool,
    pub order: i64,
}

impl OrderPatch {
    pub fn new(id: impl Into<TaskId>, partition: Partition, order: i64) -> Self {
        Self {
            id: id.into(),
            completed: partition.is_completed(),
            order,
        }
    }
}

/// Tasks of `partition` in display rank.
pub fn sorted_partition(tasks: &[Task], partition: Partition) -> Vec<&Task> {
    let mut members: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.partition() == partition)
        .collect();
    members.sort_by_key(|task| task.order);
    members
}

/// Order that appends to the end of `partition`: max + 1, or 0 when empty.
pub fn next_order(tasks: &[Task], partition: Partition) -> i64 {
    tasks
        .iter()
        .filter(|task| task.partition() == partition)
        .map(|task| task.order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Returns a copy of `tasks` with `patches` applied.
///
/// Collection sequence is preserved. Only tasks whose `completed` or `order`
/// actually changes get a fresh `updated_at`.
pub fn apply_patches(
    tasks: &[Task],
    patches: &[OrderPatch],
    now: DateTime<Utc>,
) -> OrderingResult<Vec<Task>> {
    let by_id: HashMap<&str, &OrderPatch> = patches
        .iter()
        .map(|patch| (patch.id.as_str(), patch))
        .collect();
    if let Some(unknown) = by_id
        .keys()
        .find(|id| !tasks.iter().any(|task| task.id == **id))
    {
        return Err(OrderingError::TaskNotFound((*unknown).to_string()));
    }

    Ok(tasks
        .iter()
        .map(|task| {
            let mut next = task.clone();
            if let Some(patch) = by_id.get(task.id.as_str()) {
                if next.completed != patch.completed || next.order != patch.order {
                    next.completed = patch.completed;
                    next.order = patch.order;
                    next.touch(now);
                }
            }
            next
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{apply_patches, next_order, sorted_partition, OrderPatch, OrderingError};
    use crate::model::task::{Partition, Task};
    use chrono::{Duration, TimeZone, Utc};

    fn task(id: &str, completed: bool, order: i64) -> Task {
        let mut task = Task::sample(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        task.id = id.to_string();
        task.completed = completed;
        task.order = order;
        task
    }

    #[test]
    fn next_order_is_per_partition() {
        let tasks = vec![task("a", false, 7), task("x", true, 2)];
        assert_eq!(next_order(&tasks, Partition::Pending), 8);
        assert_eq!(next_order(&tasks, Partition::Completed), 3);
        assert_eq!(next_order(&[], Partition::Completed), 0);
    }

    #[test]
    fn equal_orders_keep_collection_position() {
        let tasks = vec![task("b", false, 1), task("a", false, 1), task("c", false, 0)];
        let ids: Vec<&str> = sorted_partition(&tasks, Partition::Pending)
            .into_iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn apply_patches_touches_only_changed_tasks() {
        let tasks = vec![task("a", false, 0), task("b", false, 1)];
        let later = tasks[0].created_at + Duration::hours(2);
        let patches = vec![
            OrderPatch::new("a", Partition::Pending, 0),
            OrderPatch::new("b", Partition::Completed, 0),
        ];
        let next = apply_patches(&tasks, &patches, later).unwrap();
        assert_eq!(next[0].updated_at, tasks[0].updated_at);
        assert_eq!(next[1].updated_at, later);
        assert!(next[1].completed);
    }

    #[test]
    fn apply_patches_rejects_unknown_ids() {
        let tasks = vec![task("a", false, 0)];
        let patches = vec![OrderPatch::new("zzz", Partition::Pending, 0)];
        let err = apply_patches(&tasks, &patches, Utc::now()).unwrap_err();
        assert_eq!(err, OrderingError::TaskNotFound("zzz".to_string()));
    }
}
