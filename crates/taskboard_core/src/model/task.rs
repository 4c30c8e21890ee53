//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its persisted JSON shape.
//! - Provide typed create/update inputs and field-level validation.
//!
//! # Invariants
//! - `id` and `created_at` are immutable once a task exists.
//! - `updated_at >= created_at`.
//! - `completed` alone decides which [`Partition`] a task belongs to.
//! - `title` is never blank after trimming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Kept as a string alias because persisted payloads may carry ids that are
/// not UUIDs (the bootstrap sample uses `"1"`).
pub type TaskId = String;

/// Category assigned when create input leaves it blank.
pub const DEFAULT_CATEGORY: &str = "work";

/// Categories offered by the entry form.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "work",
    "study",
    "life",
    "health",
    "entertainment",
    "shopping",
    "other",
];

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One of the two disjoint task subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Pending,
    Completed,
}

impl Partition {
    /// Partition implied by a `completed` flag.
    pub fn of(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Pending
        }
    }

    /// Value of `completed` for tasks in this partition.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures for task input and records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Id is empty after trimming.
    EmptyId,
    /// `updated_at` precedes `created_at`.
    UpdatedBeforeCreated { id: TaskId },
    /// The same id appears more than once in a collection.
    DuplicateId(TaskId),
    /// Patch payload could not be decoded or names a field that may not change.
    MalformedPatch(String),
    /// Drop anchor is not a member of the destination partition.
    InvalidDropTarget {
        anchor_id: TaskId,
        partition: Partition,
    },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::EmptyId => write!(f, "task id must not be blank"),
            Self::UpdatedBeforeCreated { id } => {
                write!(f, "task {id} has updatedAt earlier than createdAt")
            }
            Self::DuplicateId(id) => write!(f, "duplicate task id: {id}"),
            Self::MalformedPatch(message) => write!(f, "malformed task patch: {message}"),
            Self::InvalidDropTarget {
                anchor_id,
                partition,
            } => write!(f, "drop target {anchor_id} is not in the {partition} partition"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Serialized with camelCase keys; absent optional fields are omitted rather
/// than written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Relative rank inside the task's partition.
    pub order: i64,
}

impl Task {
    /// Builds a task from create input with a fresh UUID and timestamps.
    ///
    /// The caller decides `order`; input is normalized but not validated.
    pub fn from_new(input: NewTask, order: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            description: normalize_optional(input.description),
            completed: false,
            created_at: now,
            updated_at: now,
            priority: input.priority.unwrap_or_default(),
            category: normalize_optional(input.category)
                .or_else(|| Some(DEFAULT_CATEGORY.to_string())),
            due_date: input.due_date,
            order,
        }
    }

    /// Sample task written on first use of an empty store.
    pub fn sample(now: DateTime<Utc>) -> Self {
        Self {
            id: "1".to_string(),
            title: "This is your first task".to_string(),
            description: Some("Keep building your task list~".to_string()),
            completed: false,
            created_at: now,
            updated_at: now,
            priority: Priority::High,
            category: Some(DEFAULT_CATEGORY.to_string()),
            due_date: None,
            order: 0,
        }
    }

    pub fn partition(&self) -> Partition {
        Partition::of(self.completed)
    }

    /// Returns whether the task is pending with a due date strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Refreshes `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::UpdatedBeforeCreated {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Input for creating a task.
///
/// Identity, timestamps, completion and order are always assigned by the
/// repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Typed partial update.
///
/// Only content fields are listed. For clearable fields the outer `Option`
/// means "leave unchanged" and `Some(None)` clears the value. `id`,
/// `createdAt`, `updatedAt` and unknown keys are rejected when decoding, and
/// so are `completed` and `order`: partition and rank only change through
/// toggle, move and reindex commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Decodes a patch from JSON, mapping decode failures to validation errors.
    pub fn from_json(payload: &str) -> Result<Self, TaskValidationError> {
        serde_json::from_str(payload)
            .map_err(|err| TaskValidationError::MalformedPatch(err.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(TaskValidationError::EmptyTitle);
            }
        }
        Ok(())
    }

    /// Merges this patch over `task`. Does not touch `updated_at`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = normalize_optional(description.clone());
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = &self.category {
            task.category = normalize_optional(category.clone());
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

// Present-but-null must become `Some(None)`, which plain `Option<Option<T>>`
// deserialization collapses into `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{NewTask, Partition, Priority, Task, TaskPatch, TaskValidationError};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn from_new_applies_defaults_and_trims() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let task = Task::from_new(
            NewTask {
                title: "  buy milk ".to_string(),
                description: Some("   ".to_string()),
                ..NewTask::default()
            },
            4,
            now,
        );
        assert_eq!(task.title, "buy milk");
        assert_eq!(task.description, None);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.category.as_deref(), Some("work"));
        assert_eq!(task.order, 4);
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn patch_rejects_immutable_and_unknown_fields() {
        let err = TaskPatch::from_json(r#"{"id":"x"}"#).unwrap_err();
        assert!(matches!(err, TaskValidationError::MalformedPatch(_)));
        let err = TaskPatch::from_json(r#"{"createdAt":"2024-01-01T00:00:00Z"}"#).unwrap_err();
        assert!(matches!(err, TaskValidationError::MalformedPatch(_)));
        let err = TaskPatch::from_json(r#"{"colour":"red"}"#).unwrap_err();
        assert!(matches!(err, TaskValidationError::MalformedPatch(_)));
        let err = TaskPatch::from_json(r#"{"completed":true}"#).unwrap_err();
        assert!(matches!(err, TaskValidationError::MalformedPatch(_)));
        let err = TaskPatch::from_json(r#"{"order":0}"#).unwrap_err();
        assert!(matches!(err, TaskValidationError::MalformedPatch(_)));
    }

    #[test]
    fn patch_distinguishes_clear_from_unchanged() {
        let clear = TaskPatch::from_json(r#"{"dueDate":null}"#).unwrap();
        assert_eq!(clear.due_date, Some(None));
        let untouched = TaskPatch::from_json(r#"{"priority":"high"}"#).unwrap();
        assert_eq!(untouched.due_date, None);
        assert_eq!(untouched.priority, Some(Priority::High));
    }

    #[test]
    fn overdue_requires_pending_and_past_due_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut task = Task::sample(now - Duration::days(3));
        task.due_date = Some(now - Duration::hours(1));
        assert!(task.is_overdue(now));
        task.due_date = Some(now);
        assert!(!task.is_overdue(now));
        task.due_date = Some(now - Duration::hours(1));
        task.completed = true;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn touch_never_moves_before_creation() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut task = Task::sample(now);
        task.touch(now - Duration::minutes(5));
        assert_eq!(task.updated_at, now);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn partition_follows_completed_flag() {
        assert_eq!(Partition::of(false), Partition::Pending);
        assert_eq!(Partition::of(true), Partition::Completed);
        assert!(Partition::Completed.is_completed());
        assert_eq!(Partition::Pending.opposite(), Partition::Completed);
    }
}
