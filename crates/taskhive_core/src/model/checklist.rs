//! Checklist sub-documents and the merge-only update contract.
//!
//! # Responsibility
//! - Define the embedded checklist item record.
//! - Provide the pure merge of item patches into an existing checklist.
//!
//! # Invariants
//! - Checklist length never changes under merge: no insert, no remove.
//! - Output ordering always matches the existing checklist's ordering.
//! - Patches whose item id matches no existing item are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Stable identifier of one checklist item, unique within its parent task.
pub type ChecklistItemId = Uuid;

/// One embedded sub-task with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Stable item id. Fresh per replica; never shared across tasks.
    pub uuid: ChecklistItemId,
    pub description: String,
    /// Completion flag, `false` for newly created items.
    pub completed: bool,
}

impl ChecklistItem {
    /// Creates an open item with a generated stable id.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), description)
    }

    /// Creates an open item with a caller-provided stable id.
    pub fn with_id(uuid: ChecklistItemId, description: impl Into<String>) -> Self {
        Self {
            uuid,
            description: description.into(),
            completed: false,
        }
    }

    /// Copies content into an independently-owned item with a fresh id.
    ///
    /// Used by replica construction: mutating the copy must never be
    /// observable through the source item.
    pub fn independent_copy(&self) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            description: self.description.clone(),
            completed: self.completed,
        }
    }
}

/// Partial update for one checklist item, addressed by item id.
///
/// `None` means "field omitted, leave unchanged". `Some(false)` on
/// `completed` is a real value and is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItemPatch {
    pub uuid: ChecklistItemId,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl ChecklistItemPatch {
    /// Creates an empty patch addressing one item.
    pub fn new(uuid: ChecklistItemId) -> Self {
        Self {
            uuid,
            description: None,
            completed: None,
        }
    }
}

/// Merges item patches into an existing checklist by item identity.
///
/// Pure function: no side effects beyond the returned checklist.
///
/// # Contract
/// - `description` is applied only when supplied and non-blank; a supplied
///   blank value leaves the field unchanged.
/// - `completed` is applied whenever supplied, including `Some(false)`.
/// - When several patches address one item id, the later patch wins per
///   field.
/// - Idempotent: applying the same patch set twice equals applying it once.
pub fn merge_checklist(
    existing: &[ChecklistItem],
    updates: &[ChecklistItemPatch],
) -> Vec<ChecklistItem> {
    let mut patches: HashMap<ChecklistItemId, ChecklistItemPatch> =
        HashMap::with_capacity(updates.len());
    for update in updates {
        let entry = patches
            .entry(update.uuid)
            .or_insert_with(|| ChecklistItemPatch::new(update.uuid));
        if update.description.is_some() {
            entry.description = update.description.clone();
        }
        if update.completed.is_some() {
            entry.completed = update.completed;
        }
    }

    existing
        .iter()
        .map(|item| {
            let mut merged = item.clone();
            if let Some(patch) = patches.get(&item.uuid) {
                if let Some(description) = patch.description.as_deref() {
                    if !description.trim().is_empty() {
                        merged.description = description.to_string();
                    }
                }
                if let Some(completed) = patch.completed {
                    merged.completed = completed;
                }
            }
            merged
        })
        .collect()
}
