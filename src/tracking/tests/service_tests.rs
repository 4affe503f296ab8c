//! Service orchestration tests for task creation and transitions.

use std::sync::Arc;

use crate::tracking::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        ErrorReport, NewTaskRecord, Priority, StateChange, StateName, TaskDetail, TaskFilter,
        TaskId, TaskSummary, TrackingDomainError,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
    services::{
        AdvanceStateRequest, CreateTaskRequest, TaskListQuery, TaskTrackingError,
        TaskTrackingService,
    },
};
use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = TaskTrackingService<InMemoryTaskStore, DefaultClock>;

#[fixture]
fn service() -> TestService {
    TaskTrackingService::new(Arc::new(InMemoryTaskStore::new()), Arc::new(DefaultClock))
}

/// Store double whose every operation fails with a persistence error.
struct FailingTaskStore;

fn injected_failure() -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other("injected storage failure"))
}

#[async_trait]
impl TaskStore for FailingTaskStore {
    async fn create(&self, _record: &NewTaskRecord) -> TaskStoreResult<()> {
        Err(injected_failure())
    }

    async fn transition(&self, _task_id: &TaskId, _change: &StateChange) -> TaskStoreResult<()> {
        Err(injected_failure())
    }

    async fn fetch(&self, _task_id: &TaskId) -> TaskStoreResult<Option<TaskDetail>> {
        Err(injected_failure())
    }

    async fn list(&self, _filter: &TaskFilter) -> TaskStoreResult<Vec<TaskSummary>> {
        Err(injected_failure())
    }

    async fn reset(&self) -> TaskStoreResult<()> {
        Err(injected_failure())
    }
}

#[fixture]
fn failing_service() -> TaskTrackingService<FailingTaskStore, DefaultClock> {
    TaskTrackingService::new(Arc::new(FailingTaskStore), Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_applies_documented_defaults(service: TestService) {
    let task_id = service
        .create_task(CreateTaskRequest::new(
            "task-1",
            "document-review",
            "Review the draft",
        ))
        .await
        .expect("task creation should succeed");
    assert_eq!(task_id.as_str(), "task-1");

    let detail = service
        .get_task("task-1")
        .await
        .expect("lookup should succeed")
        .expect("task should exist");

    let task = detail.task();
    assert_eq!(task.current_state().as_str(), "initial");
    assert_eq!(task.completion_state().as_str(), "completion");
    assert_eq!(task.workflow().name(), "document-review");
    assert_eq!(task.workflow().version(), "1.0");
    assert!(!task.workflow().id().as_str().is_empty());
    assert_eq!(task.creator_id(), "system");
    assert_eq!(task.priority(), Priority::Normal);
    assert_eq!(task.max_retries(), 3);
    assert_eq!(task.timeout_seconds(), 120);
    assert_eq!(detail.payload().prompt(), "Review the draft");
    assert_eq!(detail.history().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_honours_explicit_overrides(service: TestService) {
    service
        .create_task(
            CreateTaskRequest::new("task-1", "document-review", "Review the draft")
                .with_workflow_id("wf-override")
                .with_workflow_version("2.1")
                .with_initial_state("queued")
                .with_completion_state("archived")
                .with_creator_id("scheduler")
                .with_priority(Priority::High)
                .with_max_retries(5)
                .with_timeout_seconds(600)
                .with_next_states(vec!["processing".to_owned(), "archived".to_owned()]),
        )
        .await
        .expect("task creation should succeed");

    let detail = service
        .get_task("task-1")
        .await
        .expect("lookup should succeed")
        .expect("task should exist");

    let task = detail.task();
    assert_eq!(task.workflow().id().as_str(), "wf-override");
    assert_eq!(task.workflow().version(), "2.1");
    assert_eq!(task.current_state().as_str(), "queued");
    assert_eq!(task.completion_state().as_str(), "archived");
    assert_eq!(task.creator_id(), "scheduler");
    assert_eq!(task.priority(), Priority::High);
    assert_eq!(task.max_retries(), 5);
    assert_eq!(task.timeout_seconds(), 600);
    let next: Vec<&str> = detail
        .payload()
        .next_states()
        .iter()
        .map(StateName::as_str)
        .collect();
    assert_eq!(next, vec!["processing", "archived"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_an_empty_prompt(service: TestService) {
    let result = service
        .create_task(CreateTaskRequest::new("task-1", "document-review", "   "))
        .await;
    assert!(matches!(
        result,
        Err(TaskTrackingError::Domain(TrackingDomainError::EmptyPrompt))
    ));

    let fetched = service
        .get_task("task-1")
        .await
        .expect("lookup should succeed");
    assert!(fetched.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_surfaces_a_duplicate_id(service: TestService) {
    service
        .create_task(CreateTaskRequest::new("task-1", "document-review", "First"))
        .await
        .expect("first creation should succeed");

    let result = service
        .create_task(CreateTaskRequest::new(
            "task-1",
            "document-review",
            "Second",
        ))
        .await;
    assert!(matches!(
        result,
        Err(TaskTrackingError::Store(TaskStoreError::DuplicateTask(
            task_id
        ))) if task_id.as_str() == "task-1"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn advancing_through_states_accumulates_results_until_completion(service: TestService) {
    service
        .create_task(CreateTaskRequest::new(
            "task-1",
            "document-review",
            "Review the draft",
        ))
        .await
        .expect("task creation should succeed");

    service
        .advance_state(
            "task-1",
            AdvanceStateRequest::new("processing").with_result("draft collected"),
        )
        .await
        .expect("first transition should succeed");
    service
        .advance_state(
            "task-1",
            AdvanceStateRequest::new("completion").with_result("review published"),
        )
        .await
        .expect("second transition should succeed");

    let detail = service
        .get_task("task-1")
        .await
        .expect("lookup should succeed")
        .expect("task should exist");

    assert!(detail.task().is_complete());
    assert_eq!(detail.history().len(), 3);
    let open_count = detail
        .history()
        .iter()
        .filter(|event| event.is_open())
        .count();
    assert_eq!(open_count, 1);

    let results = detail.payload().results();
    let initial = StateName::new("initial").expect("valid state");
    let processing = StateName::new("processing").expect("valid state");
    assert_eq!(
        results.get(&initial).map(String::as_str),
        Some("draft collected")
    );
    assert_eq!(
        results.get(&processing).map(String::as_str),
        Some("review published")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn advancing_with_an_error_marks_the_task(service: TestService) {
    service
        .create_task(CreateTaskRequest::new(
            "task-1",
            "document-review",
            "Review the draft",
        ))
        .await
        .expect("task creation should succeed");

    service
        .advance_state(
            "task-1",
            AdvanceStateRequest::new("retrying").with_error(ErrorReport::new("model call failed")),
        )
        .await
        .expect("transition should succeed");

    let detail = service
        .get_task("task-1")
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert!(detail.task().has_error());
    assert_eq!(
        detail
            .payload()
            .error_details()
            .map(ErrorReport::message),
        Some("model call failed")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn advancing_a_missing_task_reports_not_found(service: TestService) {
    let result = service
        .advance_state("task-404", AdvanceStateRequest::new("processing"))
        .await;
    assert!(matches!(
        result,
        Err(TaskTrackingError::Store(TaskStoreError::TaskNotFound(
            task_id
        ))) if task_id.as_str() == "task-404"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_tasks_filters_by_workflow(service: TestService) {
    for (task_id, workflow_id) in [("task-1", "wf-1"), ("task-2", "wf-1"), ("task-3", "wf-2")] {
        service
            .create_task(
                CreateTaskRequest::new(task_id, "document-review", "Review the draft")
                    .with_workflow_id(workflow_id),
            )
            .await
            .expect("task creation should succeed");
    }

    let summaries = service
        .list_tasks(TaskListQuery::new().with_workflow_id("wf-1"))
        .await
        .expect("listing should succeed");
    assert_eq!(summaries.len(), 2);
    assert!(
        summaries
            .iter()
            .all(|summary| summary.workflow_id.as_str() == "wf-1")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reset_all_clears_the_store(service: TestService) {
    service
        .create_task(CreateTaskRequest::new(
            "task-1",
            "document-review",
            "Review the draft",
        ))
        .await
        .expect("task creation should succeed");

    service.reset_all().await.expect("reset should succeed");

    let summaries = service
        .list_tasks(TaskListQuery::new())
        .await
        .expect("listing should succeed");
    assert!(summaries.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storage_failures_propagate_from_every_operation(
    failing_service: TaskTrackingService<FailingTaskStore, DefaultClock>,
) {
    let create = failing_service
        .create_task(CreateTaskRequest::new(
            "task-1",
            "document-review",
            "Review the draft",
        ))
        .await;
    assert!(matches!(
        create,
        Err(TaskTrackingError::Store(TaskStoreError::Persistence(_)))
    ));

    let advance = failing_service
        .advance_state("task-1", AdvanceStateRequest::new("processing"))
        .await;
    assert!(matches!(
        advance,
        Err(TaskTrackingError::Store(TaskStoreError::Persistence(_)))
    ));

    let fetch = failing_service.get_task("task-1").await;
    assert!(matches!(
        fetch,
        Err(TaskTrackingError::Store(TaskStoreError::Persistence(_)))
    ));

    let list = failing_service.list_tasks(TaskListQuery::new()).await;
    assert!(matches!(
        list,
        Err(TaskTrackingError::Store(TaskStoreError::Persistence(_)))
    ));

    let reset = failing_service.reset_all().await;
    assert!(matches!(
        reset,
        Err(TaskTrackingError::Store(TaskStoreError::Persistence(_)))
    ));
}
