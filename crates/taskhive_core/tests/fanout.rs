use std::cell::Cell;
use taskhive_core::db::open_db_in_memory;
use taskhive_core::{
    ActorId, CreateTaskFanout, FanoutError, FanoutService, NewChecklistItem, Priority, Progress,
    RepoError, RepoResult, SqliteTaskRepository, Task, TaskCountSummary, TaskId, TaskRepository,
    TaskValidationError,
};
use uuid::Uuid;

fn sprint_plan_request(assignees: Vec<ActorId>) -> CreateTaskFanout {
    CreateTaskFanout {
        title: "Sprint Plan".to_string(),
        priority: Priority::High,
        progress: None,
        checklist: vec![NewChecklistItem::new("Write spec")],
        due_date: None,
        assignees,
    }
}

#[test]
fn create_fans_out_one_replica_per_distinct_assignee() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));
    let reader = SqliteTaskRepository::new(&conn);

    let actor = Uuid::new_v4();
    let teammate = Uuid::new_v4();
    let created = service
        .create_tasks(&sprint_plan_request(vec![teammate]), actor)
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].assigned_to, vec![actor]);
    assert_eq!(created[1].assigned_to, vec![teammate]);
    for replica in &created {
        assert_eq!(replica.title, "Sprint Plan");
        assert_eq!(replica.created_by, actor);
        assert_eq!(replica.progress, Progress::Todo);
        assert_eq!(replica.assigned_to.len(), 1);
        assert_eq!(replica.checklist.len(), 1);

        let persisted = reader.get_task(replica.uuid).unwrap().unwrap();
        assert_eq!(&persisted, replica);
    }

    // Sibling replicas own independent checklists.
    assert_ne!(created[0].checklist[0].uuid, created[1].checklist[0].uuid);
}

#[test]
fn create_collapses_duplicates_and_always_includes_the_actor() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));

    let actor = Uuid::new_v4();
    let teammate = Uuid::new_v4();
    let created = service
        .create_tasks(
            &sprint_plan_request(vec![teammate, actor, teammate]),
            actor,
        )
        .unwrap();

    assert_eq!(created.len(), 2);
    let assignees: Vec<ActorId> = created
        .iter()
        .map(|replica| replica.assigned_to[0])
        .collect();
    assert_eq!(assignees, vec![actor, teammate]);
}

#[test]
fn create_without_explicit_assignees_yields_single_replica() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));

    let actor = Uuid::new_v4();
    let created = service
        .create_tasks(&sprint_plan_request(Vec::new()), actor)
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].assigned_to, vec![actor]);
}

#[test]
fn create_applies_requested_progress_due_date_and_seed_completion() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));

    let actor = Uuid::new_v4();
    let mut request = sprint_plan_request(Vec::new());
    request.progress = Some(Progress::Backlog);
    request.due_date = Some(1_790_000_000_000);
    request.checklist.push(NewChecklistItem {
        description: "Already done in kickoff".to_string(),
        completed: true,
    });

    let created = service.create_tasks(&request, actor).unwrap();
    assert_eq!(created[0].progress, Progress::Backlog);
    assert_eq!(created[0].due_date, Some(1_790_000_000_000));
    assert!(!created[0].checklist[0].completed);
    assert!(created[0].checklist[1].completed);
}

#[test]
fn create_validates_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));
    let reader = SqliteTaskRepository::new(&conn);

    let actor = Uuid::new_v4();
    let mut request = sprint_plan_request(vec![Uuid::new_v4()]);
    request.title = "  ".to_string();
    let err = service.create_tasks(&request, actor).unwrap_err();
    assert!(matches!(
        err,
        FanoutError::Validation(TaskValidationError::BlankTitle)
    ));

    let mut request = sprint_plan_request(vec![Uuid::new_v4()]);
    request.checklist.clear();
    let err = service.create_tasks(&request, actor).unwrap_err();
    assert!(matches!(
        err,
        FanoutError::Validation(TaskValidationError::EmptyChecklist)
    ));

    assert!(reader.list_tasks_for_assignee(actor).unwrap().is_empty());
}

#[test]
fn partial_write_failure_reports_already_persisted_replicas() {
    let conn = open_db_in_memory().unwrap();
    let reader = SqliteTaskRepository::new(&conn);
    let service = FanoutService::new(FlakyRepo {
        inner: SqliteTaskRepository::new(&conn),
        remaining_creates: Cell::new(2),
    });

    let actor = Uuid::new_v4();
    let second = Uuid::new_v4();
    let third = Uuid::new_v4();
    let err = service
        .create_tasks(&sprint_plan_request(vec![second, third]), actor)
        .unwrap_err();

    match err {
        FanoutError::PartialWrite { created, source } => {
            assert_eq!(created.len(), 2);
            assert_eq!(created[0].assigned_to, vec![actor]);
            assert_eq!(created[1].assigned_to, vec![second]);
            assert!(matches!(source, RepoError::InvalidData(_)));

            // No rollback: the reported replicas remain persisted.
            for replica in &created {
                assert!(reader.get_task(replica.uuid).unwrap().is_some());
            }
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(reader.list_tasks_for_assignee(third).unwrap().is_empty());
}

#[test]
fn replicate_copies_every_task_to_the_new_assignee() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));
    let reader = SqliteTaskRepository::new(&conn);

    let actor = Uuid::new_v4();
    let newcomer = Uuid::new_v4();
    for title in ["plan sprint", "triage bugs", "write release notes"] {
        let mut request = sprint_plan_request(Vec::new());
        request.title = title.to_string();
        service.create_tasks(&request, actor).unwrap();
    }
    let sources_before = reader.list_tasks_for_assignee(actor).unwrap();

    let created = service.replicate_tasks(actor, newcomer).unwrap();

    assert_eq!(created.len(), 3);
    for replica in &created {
        assert_eq!(replica.assigned_to, vec![newcomer]);
        assert_eq!(replica.created_by, actor);
        assert!(reader.get_task(replica.uuid).unwrap().is_some());
    }

    let mut created_titles: Vec<_> = created.iter().map(|task| task.title.clone()).collect();
    created_titles.sort();
    assert_eq!(
        created_titles,
        vec!["plan sprint", "triage bugs", "write release notes"]
    );

    // Source tasks are never modified by replication.
    let sources_after = reader.list_tasks_for_assignee(actor).unwrap();
    assert_eq!(sources_after, sources_before);
}

#[test]
fn replicate_for_actor_without_tasks_returns_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));

    let created = service
        .replicate_tasks(Uuid::new_v4(), Uuid::new_v4())
        .unwrap();
    assert!(created.is_empty());
}

#[test]
fn replicated_checklists_are_independent_of_their_sources() {
    let conn = open_db_in_memory().unwrap();
    let service = FanoutService::new(SqliteTaskRepository::new(&conn));
    let reader = SqliteTaskRepository::new(&conn);

    let actor = Uuid::new_v4();
    let newcomer = Uuid::new_v4();
    let created = service
        .create_tasks(&sprint_plan_request(Vec::new()), actor)
        .unwrap();
    let source = &created[0];

    let replicas = service.replicate_tasks(actor, newcomer).unwrap();
    let replica = &replicas[0];
    assert_ne!(replica.uuid, source.uuid);
    assert_ne!(replica.checklist[0].uuid, source.checklist[0].uuid);

    // Completing the replica's item leaves the source untouched.
    let mut mutated = replica.clone();
    mutated.checklist[0].completed = true;
    reader.update_task(&mutated).unwrap();

    let source_after = reader.get_task(source.uuid).unwrap().unwrap();
    assert!(!source_after.checklist[0].completed);
}

/// Repository wrapper that fails `create_task` after a fixed number of writes.
struct FlakyRepo<'conn> {
    inner: SqliteTaskRepository<'conn>,
    remaining_creates: Cell<u32>,
}

impl TaskRepository for FlakyRepo<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        if self.remaining_creates.get() == 0 {
            return Err(RepoError::InvalidData(
                "injected storage failure".to_string(),
            ));
        }
        self.remaining_creates.set(self.remaining_creates.get() - 1);
        self.inner.create_task(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.inner.get_task(id)
    }

    fn list_tasks_for_assignee(&self, assignee: ActorId) -> RepoResult<Vec<Task>> {
        self.inner.list_tasks_for_assignee(assignee)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        self.inner.update_task(task)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.inner.delete_task(id)
    }

    fn count_tasks_for_assignee(&self, assignee: ActorId) -> RepoResult<TaskCountSummary> {
        self.inner.count_tasks_for_assignee(assignee)
    }
}
