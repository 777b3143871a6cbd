//! Assignment-based access guard.
//!
//! # Responsibility
//! - Decide whether an actor may operate on a specific task replica.
//!
//! # Invariants
//! - An actor may read, mutate or delete a replica only when it appears in
//!   the replica's assignee list. One rule for every per-task operation.

use crate::model::task::{ActorId, Task, TaskId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Actor attempted an operation on a task it is not assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDeniedError {
    pub task_uuid: TaskId,
    pub actor_uuid: ActorId,
}

impl Display for AccessDeniedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "actor {} is not assigned to task {}",
            self.actor_uuid, self.task_uuid
        )
    }
}

impl Error for AccessDeniedError {}

/// Allows the operation iff `actor` appears in `task.assigned_to`.
pub fn ensure_assigned(task: &Task, actor: ActorId) -> Result<(), AccessDeniedError> {
    if task.is_assigned_to(actor) {
        return Ok(());
    }

    Err(AccessDeniedError {
        task_uuid: task.uuid,
        actor_uuid: actor,
    })
}
