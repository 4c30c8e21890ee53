//! Repository layer over the task store.
//!
//! # Responsibility
//! - Hold the authoritative in-memory collection.
//! - Isolate persistence details from command orchestration.
//!
//! # Invariants
//! - Writes validate input before mutating memory.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`) and
//!   report store failures without rolling back.

pub mod task_repo;
