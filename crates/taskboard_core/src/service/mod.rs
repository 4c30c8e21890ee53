//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and ordering-engine calls into board commands.
//! - Keep interaction layers decoupled from storage details.

pub mod command;
pub mod task_service;
