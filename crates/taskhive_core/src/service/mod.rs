//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs: fan-out
//!   creation, per-replica mutation, assignee analytics.
//! - Keep transport/FFI layers decoupled from storage details.

pub mod access;
pub mod analytics_service;
pub mod fanout_service;
pub mod task_service;
