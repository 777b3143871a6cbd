//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide per-document CRUD over task replicas.
//! - Provide the grouped-count aggregation used by analytics.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Task::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Checklist and assignee list persist as embedded ordered JSON sequences.

use crate::db::DbError;
use crate::model::checklist::ChecklistItem;
use crate::model::task::{ActorId, Priority, Progress, Task, TaskId, TaskValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    priority,
    progress,
    created_by,
    assigned_to,
    checklist,
    due_date
FROM tasks";

// Why: assignee uuids live inside the assigned_to JSON sequence, so
// membership filters must unpack it with json_each instead of comparing the
// column directly.
const ASSIGNEE_MATCH_SQL: &str =
    "EXISTS (SELECT 1 FROM json_each(tasks.assigned_to) WHERE json_each.value = ?1)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sparse grouped counts over one assignee-filtered task set.
///
/// Only categories present in storage appear in the bucket lists; zero
/// filling is the analytics layer's concern. All groupings are computed
/// over the same filter in one logical aggregation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCountSummary {
    /// `(progress, count)` buckets, ordered by progress category.
    pub progress: Vec<(Progress, u64)>,
    /// `(priority, count)` buckets, ordered by priority level.
    pub priority: Vec<(Priority, u64)>,
    /// Tasks in the filtered set with a due date present.
    pub with_due_date: u64,
}

/// Repository interface for task replica operations.
///
/// Each write touches exactly one document; the store guarantees atomicity
/// per document and nothing across documents.
pub trait TaskRepository {
    /// Persists one task replica as an independent create.
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Gets one task by id.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists every task whose assignee list contains `assignee`.
    fn list_tasks_for_assignee(&self, assignee: ActorId) -> RepoResult<Vec<Task>>;
    /// Replaces the full task document by id.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Hard-deletes one task by id.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Computes grouped counts for all analytics groupings in one call.
    fn count_tasks_for_assignee(&self, assignee: ActorId) -> RepoResult<TaskCountSummary>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                priority,
                progress,
                created_by,
                assigned_to,
                checklist,
                due_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.uuid.to_string(),
                task.title.as_str(),
                task.priority.level(),
                progress_to_db(task.progress),
                task.created_by.to_string(),
                encode_actor_refs(&task.assigned_to)?,
                encode_checklist(&task.checklist)?,
                task.due_date,
            ],
        )?;

        Ok(task.uuid)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks_for_assignee(&self, assignee: ActorId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE {ASSIGNEE_MATCH_SQL}
             ORDER BY updated_at DESC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([assignee.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                priority = ?2,
                progress = ?3,
                assigned_to = ?4,
                checklist = ?5,
                due_date = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                task.title.as_str(),
                task.priority.level(),
                progress_to_db(task.progress),
                encode_actor_refs(&task.assigned_to)?,
                encode_checklist(&task.checklist)?,
                task.due_date,
                task.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.uuid));
        }

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_tasks_for_assignee(&self, assignee: ActorId) -> RepoResult<TaskCountSummary> {
        let assignee_text = assignee.to_string();

        let mut progress = Vec::new();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT progress, COUNT(*) FROM tasks
             WHERE {ASSIGNEE_MATCH_SQL}
             GROUP BY progress
             ORDER BY progress;"
        ))?;
        let mut rows = stmt.query([assignee_text.as_str()])?;
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            let bucket = parse_progress(&value).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid progress value `{value}` in tasks.progress"))
            })?;
            progress.push((bucket, row.get::<_, u64>(1)?));
        }

        let mut priority = Vec::new();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT priority, COUNT(*) FROM tasks
             WHERE {ASSIGNEE_MATCH_SQL}
             GROUP BY priority
             ORDER BY priority;"
        ))?;
        let mut rows = stmt.query([assignee_text.as_str()])?;
        while let Some(row) = rows.next()? {
            let level: i64 = row.get(0)?;
            let bucket = Priority::from_level(level).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid priority level `{level}` in tasks.priority"))
            })?;
            priority.push((bucket, row.get::<_, u64>(1)?));
        }

        let with_due_date: u64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM tasks
                 WHERE {ASSIGNEE_MATCH_SQL} AND due_date IS NOT NULL;"
            ),
            [assignee_text.as_str()],
            |row| row.get(0),
        )?;

        Ok(TaskCountSummary {
            progress,
            priority,
            with_due_date,
        })
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid = parse_uuid_column(row, "uuid")?;
    let created_by = parse_uuid_column(row, "created_by")?;

    let level: i64 = row.get("priority")?;
    let priority = Priority::from_level(level).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority level `{level}` in tasks.priority"))
    })?;

    let progress_text: String = row.get("progress")?;
    let progress = parse_progress(&progress_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid progress value `{progress_text}` in tasks.progress"
        ))
    })?;

    let assigned_to_json: String = row.get("assigned_to")?;
    let assigned_to: Vec<ActorId> = serde_json::from_str(&assigned_to_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid tasks.assigned_to sequence: {err}"))
    })?;

    let checklist_json: String = row.get("checklist")?;
    let checklist: Vec<ChecklistItem> = serde_json::from_str(&checklist_json)
        .map_err(|err| RepoError::InvalidData(format!("invalid tasks.checklist sequence: {err}")))?;

    let task = Task {
        uuid,
        title: row.get("title")?,
        priority,
        progress,
        created_by,
        assigned_to,
        checklist,
        due_date: row.get("due_date")?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in tasks.{column}"))
    })
}

fn encode_actor_refs(actors: &[ActorId]) -> RepoResult<String> {
    serde_json::to_string(actors)
        .map_err(|err| RepoError::InvalidData(format!("unencodable assignee sequence: {err}")))
}

fn encode_checklist(checklist: &[ChecklistItem]) -> RepoResult<String> {
    serde_json::to_string(checklist)
        .map_err(|err| RepoError::InvalidData(format!("unencodable checklist sequence: {err}")))
}

fn progress_to_db(progress: Progress) -> &'static str {
    match progress {
        Progress::Backlog => "backlog",
        Progress::Todo => "todo",
        Progress::InProgress => "in_progress",
        Progress::Done => "done",
    }
}

fn parse_progress(value: &str) -> Option<Progress> {
    match value {
        "backlog" => Some(Progress::Backlog),
        "todo" => Some(Progress::Todo),
        "in_progress" => Some(Progress::InProgress),
        "done" => Some(Progress::Done),
        _ => None,
    }
}
