use taskhive_core::db::open_db_in_memory;
use taskhive_core::{
    AnalyticsService, ChecklistItem, Priority, Progress, SqliteTaskRepository, Task,
    TaskRepository,
};
use uuid::Uuid;

fn seed_task(
    repo: &SqliteTaskRepository<'_>,
    assignee: Uuid,
    progress: Progress,
    priority: Priority,
    due_date: Option<i64>,
) -> Task {
    let mut task = Task::new(
        "analytics probe",
        priority,
        Uuid::new_v4(),
        assignee,
        vec![ChecklistItem::new("step")],
    );
    task.progress = progress;
    task.due_date = due_date;
    repo.create_task(&task).unwrap();
    task
}

#[test]
fn grouped_counts_cover_all_dimensions_for_one_assignee() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let actor = Uuid::new_v4();

    seed_task(&repo, actor, Progress::Backlog, Priority::High, None);
    seed_task(
        &repo,
        actor,
        Progress::Backlog,
        Priority::High,
        Some(1_800_000_000_000),
    );
    seed_task(&repo, actor, Progress::Todo, Priority::Moderate, None);
    seed_task(
        &repo,
        actor,
        Progress::InProgress,
        Priority::Low,
        Some(1_810_000_000_000),
    );
    seed_task(&repo, actor, Progress::Done, Priority::Low, None);

    // A different assignee's task must not leak into the filtered set.
    seed_task(
        &repo,
        Uuid::new_v4(),
        Progress::Done,
        Priority::High,
        Some(1_820_000_000_000),
    );

    let service = AnalyticsService::new(SqliteTaskRepository::new(&conn));
    let analytics = service.task_analytics(actor).unwrap();

    assert_eq!(analytics.progress.backlog, 2);
    assert_eq!(analytics.progress.todo, 1);
    assert_eq!(analytics.progress.in_progress, 1);
    assert_eq!(analytics.progress.done, 1);

    assert_eq!(analytics.priority.high, 2);
    assert_eq!(analytics.priority.moderate, 1);
    assert_eq!(analytics.priority.low, 2);

    assert_eq!(analytics.due_date_count, 2);
}

#[test]
fn histograms_sum_to_the_filtered_task_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let actor = Uuid::new_v4();

    let combos = [
        (Progress::Backlog, Priority::High),
        (Progress::Todo, Priority::High),
        (Progress::Todo, Priority::Moderate),
        (Progress::InProgress, Priority::Low),
        (Progress::Done, Priority::Moderate),
        (Progress::Done, Priority::Low),
        (Progress::Done, Priority::Low),
    ];
    for (progress, priority) in combos {
        seed_task(&repo, actor, progress, priority, None);
    }

    let service = AnalyticsService::new(SqliteTaskRepository::new(&conn));
    let analytics = service.task_analytics(actor).unwrap();

    let expected_total = combos.len() as u64;
    assert_eq!(analytics.progress.total(), expected_total);
    assert_eq!(analytics.priority.total(), expected_total);
}

#[test]
fn absent_categories_are_zero_filled() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let actor = Uuid::new_v4();

    seed_task(&repo, actor, Progress::Done, Priority::Moderate, None);

    let service = AnalyticsService::new(SqliteTaskRepository::new(&conn));
    let analytics = service.task_analytics(actor).unwrap();

    assert_eq!(analytics.progress.backlog, 0);
    assert_eq!(analytics.progress.todo, 0);
    assert_eq!(analytics.progress.in_progress, 0);
    assert_eq!(analytics.progress.done, 1);
    assert_eq!(analytics.priority.high, 0);
    assert_eq!(analytics.priority.moderate, 1);
    assert_eq!(analytics.priority.low, 0);
    assert_eq!(analytics.due_date_count, 0);
}

#[test]
fn actor_without_tasks_gets_an_all_zero_report() {
    let conn = open_db_in_memory().unwrap();
    let service = AnalyticsService::new(SqliteTaskRepository::new(&conn));

    let analytics = service.task_analytics(Uuid::new_v4()).unwrap();

    assert_eq!(analytics.progress.total(), 0);
    assert_eq!(analytics.priority.total(), 0);
    assert_eq!(analytics.due_date_count, 0);
}

#[test]
fn repeated_computation_over_the_same_set_is_deterministic() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let actor = Uuid::new_v4();

    for index in 0..6 {
        let progress = match index % 3 {
            0 => Progress::Backlog,
            1 => Progress::InProgress,
            _ => Progress::Done,
        };
        let priority = if index % 2 == 0 {
            Priority::High
        } else {
            Priority::Low
        };
        let due_date = (index % 2 == 1).then_some(1_800_000_000_000 + index);
        seed_task(&repo, actor, progress, priority, due_date);
    }

    let service = AnalyticsService::new(SqliteTaskRepository::new(&conn));
    let first = service.task_analytics(actor).unwrap();
    let second = service.task_analytics(actor).unwrap();
    assert_eq!(first, second);
}

#[test]
fn analytics_serialization_uses_expected_wire_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let actor = Uuid::new_v4();
    seed_task(
        &repo,
        actor,
        Progress::InProgress,
        Priority::High,
        Some(1_830_000_000_000),
    );

    let service = AnalyticsService::new(SqliteTaskRepository::new(&conn));
    let analytics = service.task_analytics(actor).unwrap();

    let json = serde_json::to_value(analytics).unwrap();
    assert_eq!(json["progress"]["backlog"], 0);
    assert_eq!(json["progress"]["inProgress"], 1);
    assert_eq!(json["priority"]["high"], 1);
    assert_eq!(json["priority"]["low"], 0);
    assert_eq!(json["dueDateCount"], 1);
}
