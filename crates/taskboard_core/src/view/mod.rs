//! View projection over the task collection.
//!
//! # Responsibility
//! - Derive pending/completed/all lists sorted by `order`.
//! - Compute board statistics and text/attribute filters.
//!
//! # Invariants
//! - Every projection is recomputed from the collection; nothing is cached.
//! - Sorting is stable, so equal orders keep collection position.

use crate::model::task::{Partition, Priority, Task};
use crate::ordering::sorted_partition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Board counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Pending tasks whose due date is strictly before the evaluation time.
    pub overdue: usize,
}

/// Status selector of [`TaskFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

/// Attribute filter carried over from the board toolbar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        let priority_ok = self.priority.map_or(true, |priority| task.priority == priority);
        let category_ok = self.category.as_deref().map_or(true, |category| {
            task.category
                .as_deref()
                .is_some_and(|value| value.eq_ignore_ascii_case(category.trim()))
        });
        status_ok && priority_ok && category_ok
    }
}

pub fn pending(tasks: &[Task]) -> Vec<&Task> {
    sorted_partition(tasks, Partition::Pending)
}

pub fn completed(tasks: &[Task]) -> Vec<&Task> {
    sorted_partition(tasks, Partition::Completed)
}

/// Whole collection sorted by `order`.
///
/// Cross-partition comparison is for display only; `order` is unique per
/// partition, not globally.
pub fn all(tasks: &[Task]) -> Vec<&Task> {
    let mut items: Vec<&Task> = tasks.iter().collect();
    items.sort_by_key(|task| task.order);
    items
}

/// Counts tasks as of `now`.
pub fn stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskStats {
        total: tasks.len(),
        pending: tasks.len() - completed,
        completed,
        overdue: tasks.iter().filter(|task| task.is_overdue(now)).count(),
    }
}

/// Case-insensitive substring match on title, description and category.
///
/// A blank query returns `tasks` unchanged.
pub fn filter<'a>(tasks: &[&'a Task], query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.to_vec();
    }

    let contains = |value: &str| value.to_lowercase().contains(&needle);
    tasks
        .iter()
        .copied()
        .filter(|task| {
            contains(&task.title)
                || task.description.as_deref().is_some_and(contains)
                || task.category.as_deref().is_some_and(contains)
        })
        .collect()
}

/// Applies an attribute filter, keeping input sequence.
pub fn apply_filter<'a>(tasks: &[&'a Task], task_filter: &TaskFilter) -> Vec<&'a Task> {
    tasks
        .iter()
        .copied()
        .filter(|task| task_filter.matches(task))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter, TaskFilter};
    use crate::model::task::{Priority, Task};
    use chrono::Utc;

    #[test]
    fn filter_query_is_trimmed_and_case_insensitive() {
        let mut task = Task::sample(Utc::now());
        task.title = "Quarterly REPORT".to_string();
        let tasks = vec![&task];

        assert_eq!(filter(&tasks, "  report ").len(), 1);
        assert_eq!(filter(&tasks, "WORK").len(), 1);
        assert!(filter(&tasks, "groceries").is_empty());
        assert_eq!(filter(&tasks, "   ").len(), 1);
    }

    #[test]
    fn attribute_filter_defaults_to_everything() {
        let task = Task::sample(Utc::now());
        assert!(TaskFilter::default().matches(&task));

        let low_only = TaskFilter {
            priority: Some(Priority::Low),
            ..TaskFilter::default()
        };
        assert!(!low_only.matches(&task));
    }
}
