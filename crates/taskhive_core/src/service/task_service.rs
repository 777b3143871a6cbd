//! Per-replica task use-case service.
//!
//! # Responsibility
//! - Provide read, list, merge-update and delete entry points gated by the
//!   assignment access guard.
//!
//! # Invariants
//! - Forbidden and not-found are detected after the read and before any
//!   write; a rejected attempt leaves stored state unchanged.
//! - An omitted patch field never changes the stored value; omitted and
//!   explicitly-supplied values are never conflated.

use crate::model::checklist::{merge_checklist, ChecklistItemPatch};
use crate::model::task::{ActorId, Priority, Progress, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use crate::service::access::{ensure_assigned, AccessDeniedError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Explicit due-date update wrapper.
///
/// Distinguishes "leave unchanged" from "clear the due date"; a bare
/// optional cannot express both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueDatePatch {
    /// Field omitted, keep the stored value.
    #[default]
    Keep,
    /// Explicitly remove the due date.
    Clear,
    /// Set the due date to the given unix epoch milliseconds.
    Set(i64),
}

/// Partial update for one task replica.
///
/// `None` means "field omitted, leave unchanged". A supplied blank title is
/// a validation error, never a silent skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub progress: Option<Progress>,
    pub due_date: DueDatePatch,
    /// Merge-only checklist item updates; never inserts or removes items.
    pub checklist: Vec<ChecklistItemPatch>,
}

/// Errors from per-replica task operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Patched record violates task invariants.
    Validation(TaskValidationError),
    /// Task id does not resolve.
    TaskNotFound(TaskId),
    /// Actor is not in the task's assignee list.
    Forbidden {
        task_uuid: TaskId,
        actor_uuid: ActorId,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Forbidden {
                task_uuid,
                actor_uuid,
            } => write!(f, "actor {actor_uuid} may not operate on task {task_uuid}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(task_uuid) => Self::TaskNotFound(task_uuid),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<AccessDeniedError> for TaskServiceError {
    fn from(value: AccessDeniedError) -> Self {
        Self::Forbidden {
            task_uuid: value.task_uuid,
            actor_uuid: value.actor_uuid,
        }
    }
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gets one task by id, restricted to its assignees.
    ///
    /// Single-task reads apply the same assignment rule as mutation and
    /// deletion.
    pub fn get_task(&self, task_uuid: TaskId, actor: ActorId) -> Result<Task, TaskServiceError> {
        let task = self
            .repo
            .get_task(task_uuid)?
            .ok_or(TaskServiceError::TaskNotFound(task_uuid))?;
        ensure_assigned(&task, actor)?;
        Ok(task)
    }

    /// Lists every task assigned to the actor, most recently updated first.
    pub fn list_tasks(&self, actor: ActorId) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks_for_assignee(actor)
    }

    /// Applies a partial update to one task replica.
    ///
    /// # Contract
    /// - Scalar fields change only when the patch supplies a value.
    /// - Checklist updates merge by item id: no insert, no remove, unmatched
    ///   ids ignored, existing ordering preserved.
    /// - The patched record is validated before the write.
    ///
    /// # Errors
    /// - `TaskNotFound` when the id does not resolve.
    /// - `Forbidden` when the actor is not assigned; stored state is left
    ///   unmodified.
    /// - `Validation` when the patched record violates invariants (for
    ///   example an explicitly supplied blank title).
    pub fn update_task(
        &self,
        task_uuid: TaskId,
        patch: &TaskPatch,
        actor: ActorId,
    ) -> Result<Task, TaskServiceError> {
        let mut task = self
            .repo
            .get_task(task_uuid)?
            .ok_or(TaskServiceError::TaskNotFound(task_uuid))?;
        ensure_assigned(&task, actor)?;

        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(progress) = patch.progress {
            task.progress = progress;
        }
        match patch.due_date {
            DueDatePatch::Keep => {}
            DueDatePatch::Clear => task.due_date = None,
            DueDatePatch::Set(epoch_ms) => task.due_date = Some(epoch_ms),
        }
        if !patch.checklist.is_empty() {
            task.checklist = merge_checklist(&task.checklist, &patch.checklist);
        }

        task.validate().map_err(TaskServiceError::Validation)?;
        self.repo.update_task(&task)?;
        Ok(task)
    }

    /// Deletes one task replica, restricted to its assignees.
    pub fn delete_task(&self, task_uuid: TaskId, actor: ActorId) -> Result<(), TaskServiceError> {
        let task = self
            .repo
            .get_task(task_uuid)?
            .ok_or(TaskServiceError::TaskNotFound(task_uuid))?;
        ensure_assigned(&task, actor)?;

        self.repo.delete_task(task.uuid)?;
        Ok(())
    }
}
