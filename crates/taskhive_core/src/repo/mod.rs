//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-store contract the core depends on: per-document
//!   atomic create/read/update/delete plus grouped counting.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - No transactional guarantee spans multiple task documents.

pub mod task_repo;
