//! Task fan-out use-case service.
//!
//! # Responsibility
//! - Create one independent task replica per distinct assignee.
//! - Replicate an actor's existing tasks to a new assignee.
//!
//! # Invariants
//! - The creating actor always receives a replica, listed or not.
//! - Every replica carries `assigned_to` of length 1 and its own deep-copied
//!   checklist.
//! - Writes are sequential, one document each, with no cross-document
//!   transaction; a mid-sequence failure reports the replicas already
//!   persisted and rolls nothing back.

use crate::model::checklist::ChecklistItem;
use crate::model::task::{ActorId, Priority, Progress, Task, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Checklist seed for task creation. Items get their ids at replica
/// construction time, one fresh id per replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChecklistItem {
    pub description: String,
    /// Starts open unless the caller pre-completes the item.
    pub completed: bool,
}

impl NewChecklistItem {
    /// Creates an open checklist seed.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            completed: false,
        }
    }
}

/// Request model for fan-out task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskFanout {
    pub title: String,
    pub priority: Priority,
    /// Omitted means `Progress::Todo`.
    pub progress: Option<Progress>,
    pub checklist: Vec<NewChecklistItem>,
    /// Optional due date in unix epoch milliseconds.
    pub due_date: Option<i64>,
    /// Explicit assignees beyond the creating actor. Duplicates collapse.
    pub assignees: Vec<ActorId>,
}

/// Errors from fan-out operations.
#[derive(Debug)]
pub enum FanoutError {
    /// Request rejected before any write.
    Validation(TaskValidationError),
    /// A replica write failed mid-sequence. `created` lists every replica
    /// already persisted; callers must treat those as existing.
    PartialWrite {
        created: Vec<Task>,
        source: RepoError,
    },
    /// Read-side repository failure, no writes attempted.
    Repo(RepoError),
}

impl Display for FanoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PartialWrite { created, source } => write!(
                f,
                "fan-out stopped after persisting {} replica(s): {source}",
                created.len()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FanoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::PartialWrite { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for FanoutError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Fan-out service facade over repository implementations.
pub struct FanoutService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> FanoutService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one independent task replica per distinct assignee.
    ///
    /// # Contract
    /// - Assignee set is the union of the actor and `request.assignees`;
    ///   duplicates collapse, the actor's replica is created first.
    /// - Each replica: `created_by = actor`, `assigned_to = [assignee]`,
    ///   deep-copied checklist with fresh item ids.
    /// - Returns every created replica, in creation order.
    ///
    /// # Errors
    /// - `Validation` before any write for blank title, empty checklist or
    ///   blank item descriptions.
    /// - `PartialWrite` when persistence fails after zero or more replicas
    ///   were already written.
    pub fn create_tasks(
        &self,
        request: &CreateTaskFanout,
        actor: ActorId,
    ) -> Result<Vec<Task>, FanoutError> {
        let checklist: Vec<ChecklistItem> = request
            .checklist
            .iter()
            .map(|seed| {
                let mut item = ChecklistItem::new(seed.description.clone());
                item.completed = seed.completed;
                item
            })
            .collect();

        let mut prototype = Task::new(
            request.title.clone(),
            request.priority,
            actor,
            actor,
            checklist,
        );
        if let Some(progress) = request.progress {
            prototype.progress = progress;
        }
        prototype.due_date = request.due_date;
        prototype.validate().map_err(FanoutError::Validation)?;

        let assignees = distinct_assignees(actor, &request.assignees);
        info!(
            "event=task_fanout module=service status=start actor={actor} assignees={}",
            assignees.len()
        );

        let mut created = Vec::with_capacity(assignees.len());
        for assignee in assignees {
            let replica = prototype.replica_for(assignee);
            if let Err(err) = self.repo.create_task(&replica) {
                error!(
                    "event=task_fanout module=service status=error actor={actor} created={} error={err}",
                    created.len()
                );
                return Err(FanoutError::PartialWrite {
                    created,
                    source: err,
                });
            }
            created.push(replica);
        }

        info!(
            "event=task_fanout module=service status=ok actor={actor} created={}",
            created.len()
        );
        Ok(created)
    }

    /// Replicates every task assigned to `actor` onto `new_assignee`.
    ///
    /// # Contract
    /// - Each new replica keeps the source's `created_by`, title, priority,
    ///   progress, due date and checklist content under a fresh identity.
    /// - Source tasks are never modified or deleted.
    /// - Zero source tasks yields `Ok(vec![])`, not an error.
    pub fn replicate_tasks(
        &self,
        actor: ActorId,
        new_assignee: ActorId,
    ) -> Result<Vec<Task>, FanoutError> {
        let source_tasks = self.repo.list_tasks_for_assignee(actor)?;
        info!(
            "event=task_replicate module=service status=start actor={actor} source_tasks={}",
            source_tasks.len()
        );

        let mut created = Vec::with_capacity(source_tasks.len());
        for source in &source_tasks {
            let replica = source.replica_for(new_assignee);
            if let Err(err) = self.repo.create_task(&replica) {
                error!(
                    "event=task_replicate module=service status=error actor={actor} created={} error={err}",
                    created.len()
                );
                return Err(FanoutError::PartialWrite {
                    created,
                    source: err,
                });
            }
            created.push(replica);
        }

        info!(
            "event=task_replicate module=service status=ok actor={actor} created={}",
            created.len()
        );
        Ok(created)
    }
}

/// Collapses duplicates while preserving first-seen order, actor first.
fn distinct_assignees(actor: ActorId, explicit: &[ActorId]) -> Vec<ActorId> {
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::with_capacity(explicit.len() + 1);
    for assignee in std::iter::once(actor).chain(explicit.iter().copied()) {
        if seen.insert(assignee) {
            ordered.push(assignee);
        }
    }
    ordered
}
