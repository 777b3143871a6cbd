//! Task replica domain model.
//!
//! # Responsibility
//! - Define the per-assignee task record created by fan-out.
//! - Provide replica construction with independently-owned sub-documents.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another replica.
//! - `created_by` is carried unchanged across all replicas of one fan-out.
//! - The checklist holds at least one item and its item ids are unique.

use crate::model::checklist::{ChecklistItem, ChecklistItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one task replica.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Opaque reference to an actor resolved by the authentication collaborator.
///
/// The core never reads actor attributes beyond identity.
pub type ActorId = Uuid;

/// Task urgency with stable numeric levels used by boundary callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Level 1.
    High,
    /// Level 2.
    Moderate,
    /// Level 3.
    Low,
}

impl Priority {
    /// Returns the stable numeric level (1 = High, 2 = Moderate, 3 = Low).
    pub fn level(self) -> i64 {
        match self {
            Self::High => 1,
            Self::Moderate => 2,
            Self::Low => 3,
        }
    }

    /// Parses a numeric level; returns `None` outside `1..=3`.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Self::High),
            2 => Some(Self::Moderate),
            3 => Some(Self::Low),
            _ => None,
        }
    }
}

/// Task lifecycle stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    /// Parked, not yet planned.
    Backlog,
    /// Planned but not started. Default for new tasks.
    #[default]
    Todo,
    /// Work is in progress.
    InProgress,
    /// Completed.
    Done,
}

/// One task replica: the per-assignee record produced by fan-out.
///
/// Replicas share logical content with their siblings at creation time but
/// are independently owned and mutated thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable replica id, unrelated to sibling replica ids.
    pub uuid: TaskId,
    pub title: String,
    pub priority: Priority,
    pub progress: Progress,
    /// Actor who initiated the fan-out; stable across all sibling replicas.
    pub created_by: ActorId,
    /// Ordered assignee references. Fan-out produces exactly one element,
    /// the schema permits more.
    pub assigned_to: Vec<ActorId>,
    /// Embedded ordered checklist, exclusively owned by this replica.
    pub checklist: Vec<ChecklistItem>,
    /// Optional due date in unix epoch milliseconds.
    pub due_date: Option<i64>,
}

/// Validation failure for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task uuid is the nil uuid.
    NilUuid,
    /// Title is empty after trim.
    BlankTitle,
    /// Task has no assignee reference.
    MissingAssignee,
    /// Checklist must contain at least one item.
    EmptyChecklist,
    /// Checklist item description is empty after trim.
    BlankChecklistItem(ChecklistItemId),
    /// Checklist item id appears more than once in one checklist.
    DuplicateChecklistItem(ChecklistItemId),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "task uuid must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::MissingAssignee => write!(f, "task must have at least one assignee"),
            Self::EmptyChecklist => write!(f, "checklist must contain at least one item"),
            Self::BlankChecklistItem(id) => {
                write!(f, "checklist item description must not be blank: {id}")
            }
            Self::DuplicateChecklistItem(id) => {
                write!(f, "duplicate checklist item id: {id}")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates one replica with a generated stable id.
    ///
    /// # Invariants
    /// - `progress` starts as `Progress::Todo`.
    /// - `due_date` starts unset.
    /// - `assigned_to` holds exactly the provided assignee.
    pub fn new(
        title: impl Into<String>,
        priority: Priority,
        created_by: ActorId,
        assignee: ActorId,
        checklist: Vec<ChecklistItem>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, priority, created_by, assignee, checklist)
    }

    /// Creates one replica with a caller-provided stable id.
    ///
    /// Used by import paths and tests where identity already exists. This
    /// constructor does not validate; repository write paths do.
    pub fn with_id(
        uuid: TaskId,
        title: impl Into<String>,
        priority: Priority,
        created_by: ActorId,
        assignee: ActorId,
        checklist: Vec<ChecklistItem>,
    ) -> Self {
        Self {
            uuid,
            title: title.into(),
            priority,
            progress: Progress::default(),
            created_by,
            assigned_to: vec![assignee],
            checklist,
            due_date: None,
        }
    }

    /// Builds an independent replica of this task for one assignee.
    ///
    /// # Contract
    /// - Fresh task id, unrelated to this task's id.
    /// - `assigned_to = [assignee]`.
    /// - Checklist is deep-copied with fresh item ids: mutating the replica's
    ///   checklist is never observable through this task.
    /// - `created_by`, title, priority, progress and due date carry over.
    pub fn replica_for(&self, assignee: ActorId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: self.title.clone(),
            priority: self.priority,
            progress: self.progress,
            created_by: self.created_by,
            assigned_to: vec![assignee],
            checklist: self
                .checklist
                .iter()
                .map(ChecklistItem::independent_copy)
                .collect(),
            due_date: self.due_date,
        }
    }

    /// Returns whether the actor appears in this replica's assignee list.
    pub fn is_assigned_to(&self, actor: ActorId) -> bool {
        self.assigned_to.contains(&actor)
    }

    /// Validates record invariants.
    ///
    /// # Errors
    /// - `NilUuid` when the task id is nil.
    /// - `BlankTitle` when the title trims to empty.
    /// - `MissingAssignee` when the assignee list is empty.
    /// - `EmptyChecklist` when the checklist has no items.
    /// - `BlankChecklistItem` / `DuplicateChecklistItem` for item-level
    ///   violations, reported with the offending item id.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.uuid.is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.assigned_to.is_empty() {
            return Err(TaskValidationError::MissingAssignee);
        }
        if self.checklist.is_empty() {
            return Err(TaskValidationError::EmptyChecklist);
        }

        let mut seen_items = BTreeSet::new();
        for item in &self.checklist {
            if item.description.trim().is_empty() {
                return Err(TaskValidationError::BlankChecklistItem(item.uuid));
            }
            if !seen_items.insert(item.uuid) {
                return Err(TaskValidationError::DuplicateChecklistItem(item.uuid));
            }
        }

        Ok(())
    }
}
