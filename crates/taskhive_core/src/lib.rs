//! Core domain logic for TaskHive.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{config, init_config, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::checklist::{merge_checklist, ChecklistItem, ChecklistItemId, ChecklistItemPatch};
pub use model::task::{ActorId, Priority, Progress, Task, TaskId, TaskValidationError};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskCountSummary, TaskRepository,
};
pub use service::access::{ensure_assigned, AccessDeniedError};
pub use service::analytics_service::{
    AnalyticsService, PriorityCounts, ProgressCounts, TaskAnalytics,
};
pub use service::fanout_service::{CreateTaskFanout, FanoutError, FanoutService, NewChecklistItem};
pub use service::task_service::{DueDatePatch, TaskPatch, TaskService, TaskServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
