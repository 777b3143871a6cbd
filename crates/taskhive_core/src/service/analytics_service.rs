//! Assignee task analytics.
//!
//! # Responsibility
//! - Compute grouped counts (progress, priority, due-date presence) over
//!   the set of tasks assigned to one actor.
//!
//! # Invariants
//! - Every fixed category is always present, zero-filled when absent.
//! - Progress and priority counts each sum to the filtered task count.
//! - Identical input sets produce identical output regardless of storage
//!   iteration order.

use crate::model::task::{ActorId, Priority, Progress};
use crate::repo::task_repo::{RepoResult, TaskRepository};
use serde::Serialize;

/// Task counts per progress category, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCounts {
    pub backlog: u64,
    pub todo: u64,
    pub in_progress: u64,
    pub done: u64,
}

impl ProgressCounts {
    /// Sum over all progress categories.
    pub fn total(&self) -> u64 {
        self.backlog + self.todo + self.in_progress + self.done
    }
}

/// Task counts per priority label, zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCounts {
    pub high: u64,
    pub moderate: u64,
    pub low: u64,
}

impl PriorityCounts {
    /// Sum over all priority labels.
    pub fn total(&self) -> u64 {
        self.high + self.moderate + self.low
    }
}

/// Grouped analytics over one actor's assigned tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalytics {
    pub progress: ProgressCounts,
    pub priority: PriorityCounts,
    /// Tasks in the same filtered set with a due date present.
    pub due_date_count: u64,
}

/// Analytics service facade over repository implementations.
pub struct AnalyticsService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> AnalyticsService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Computes grouped counts over the actor's assigned tasks.
    ///
    /// All groupings are derived from one repository aggregation call over
    /// the same assignee filter; the result need not reflect one atomic
    /// snapshot across groupings.
    pub fn task_analytics(&self, actor: ActorId) -> RepoResult<TaskAnalytics> {
        let summary = self.repo.count_tasks_for_assignee(actor)?;

        let mut progress = ProgressCounts::default();
        for &(bucket, count) in &summary.progress {
            match bucket {
                Progress::Backlog => progress.backlog += count,
                Progress::Todo => progress.todo += count,
                Progress::InProgress => progress.in_progress += count,
                Progress::Done => progress.done += count,
            }
        }

        let mut priority = PriorityCounts::default();
        for &(bucket, count) in &summary.priority {
            match bucket {
                Priority::High => priority.high += count,
                Priority::Moderate => priority.moderate += count,
                Priority::Low => priority.low += count,
            }
        }

        Ok(TaskAnalytics {
            progress,
            priority,
            due_date_count: summary.with_due_date,
        })
    }
}
