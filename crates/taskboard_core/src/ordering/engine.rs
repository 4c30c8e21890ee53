//! Move, transfer and reindex primitives.

use super::{next_order, sorted_partition, OrderPatch, OrderingError, OrderingResult};
use crate::model::task::{Partition, Task, TaskId};
use std::collections::HashSet;

/// Appends a task to the end of `target`.
///
/// Returns no patches when the task is already in `target`.
pub fn move_across_partition(
    tasks: &[Task],
    task_id: &str,
    target: Partition,
) -> OrderingResult<Vec<OrderPatch>> {
    let task = find(tasks, task_id)?;
    if task.partition() == target {
        return Ok(Vec::new());
    }
    Ok(vec![OrderPatch::new(
        task_id,
        target,
        next_order(tasks, target),
    )])
}

/// Inserts a task into `target` right before `anchor_id`.
///
/// The destination is renumbered by position, with every rank at or after
/// the anchor's shifted by one; the moved task takes the anchor's old rank.
/// When the task already lives in `target` this is a within-partition splice
/// from the task's rank to the anchor's rank.
pub fn move_across_partition_onto(
    tasks: &[Task],
    task_id: &str,
    target: Partition,
    anchor_id: &str,
) -> OrderingResult<Vec<OrderPatch>> {
    let task = find(tasks, task_id)?;
    let destination = sorted_partition(tasks, target);
    let anchor_index = match destination.iter().position(|member| member.id == anchor_id) {
        Some(index) => index,
        None => {
            find(tasks, anchor_id)?;
            return Err(OrderingError::AnchorNotInPartition {
                anchor_id: anchor_id.to_string(),
                partition: target,
            });
        }
    };

    if task.partition() == target {
        let from_index = destination
            .iter()
            .position(|member| member.id == task_id)
            .ok_or_else(|| OrderingError::TaskNotFound(task_id.to_string()))?;
        return reorder_within_partition(tasks, target, from_index, anchor_index);
    }

    let mut patches: Vec<OrderPatch> = destination
        .iter()
        .enumerate()
        .map(|(position, member)| {
            let rank = if position >= anchor_index {
                position + 1
            } else {
                position
            };
            OrderPatch::new(member.id.clone(), target, rank as i64)
        })
        .collect();
    patches.push(OrderPatch::new(task_id, target, anchor_index as i64));
    Ok(patches)
}

/// Moves the task at rank `from_index` to rank `to_index` (list splice) and
/// renumbers the whole partition from 0.
pub fn reorder_within_partition(
    tasks: &[Task],
    partition: Partition,
    from_index: usize,
    to_index: usize,
) -> OrderingResult<Vec<OrderPatch>> {
    let mut sequence = sorted_partition(tasks, partition);
    let len = sequence.len();
    for index in [from_index, to_index] {
        if index >= len {
            return Err(OrderingError::IndexOutOfRange {
                partition,
                index,
                len,
            });
        }
    }
    if from_index == to_index {
        return Ok(Vec::new());
    }

    let moved = sequence.remove(from_index);
    sequence.insert(to_index, moved);
    Ok(renumber(sequence.iter().map(|task| task.id.as_str()), partition))
}

/// Assigns contiguous ranks to `partition` following `ordered_ids`.
///
/// `ordered_ids` must name every member exactly once and nothing else.
pub fn reindex_partition(
    tasks: &[Task],
    partition: Partition,
    ordered_ids: &[TaskId],
) -> OrderingResult<Vec<OrderPatch>> {
    let members = sorted_partition(tasks, partition);
    let member_ids: HashSet<&str> = members.iter().map(|task| task.id.as_str()).collect();

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    let unexpected: Vec<TaskId> = ordered_ids
        .iter()
        .filter(|id| !member_ids.contains(id.as_str()) || !seen.insert(id.as_str()))
        .cloned()
        .collect();
    let missing: Vec<TaskId> = members
        .iter()
        .filter(|task| !seen.contains(task.id.as_str()))
        .map(|task| task.id.clone())
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(OrderingError::InconsistentSet {
            partition,
            missing,
            unexpected,
        });
    }

    Ok(renumber(ordered_ids.iter().map(String::as_str), partition))
}

fn renumber<'a>(ids: impl Iterator<Item = &'a str>, partition: Partition) -> Vec<OrderPatch> {
    ids.enumerate()
        .map(|(rank, id)| OrderPatch::new(id, partition, rank as i64))
        .collect()
}

fn find<'a>(tasks: &'a [Task], id: &str) -> OrderingResult<&'a Task> {
    tasks
        .iter()
        .find(|task| task.id == id)
        .ok_or_else(|| OrderingError::TaskNotFound(id.to_string()))
}
