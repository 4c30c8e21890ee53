//! Domain model for the task board.
//!
//! # Responsibility
//! - Define the canonical task record shared by every view.
//! - Keep create/update inputs statically typed.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
