//! End-to-end workflow run against the in-memory store.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::{fixture, rstest};
use stateline::tracking::{
    adapters::memory::InMemoryTaskStore,
    domain::{StateName, TaskDetail},
    services::{AdvanceStateRequest, CreateTaskRequest, TaskListQuery, TaskTrackingService},
};

type TestService = TaskTrackingService<InMemoryTaskStore, DefaultClock>;

#[fixture]
fn service() -> TestService {
    TaskTrackingService::new(Arc::new(InMemoryTaskStore::new()), Arc::new(DefaultClock))
}

/// Asserts the detail carries a consistent history: entry times ascend
/// and exactly one event is still open.
///
/// # Errors
///
/// Returns an error when the history ordering or open-event invariant
/// does not hold.
fn assert_consistent_history(detail: &TaskDetail) -> Result<(), eyre::Report> {
    let open_count = detail
        .history()
        .iter()
        .filter(|event| event.is_open())
        .count();
    eyre::ensure!(
        open_count == 1,
        "expected exactly one open event, found {open_count}"
    );
    let open = detail
        .history()
        .iter()
        .find(|event| event.is_open())
        .ok_or_else(|| eyre::eyre!("expected an open event"))?;
    eyre::ensure!(
        open.state_name() == detail.task().current_state(),
        "open event does not match the current state"
    );
    eyre::ensure!(
        detail
            .history()
            .is_sorted_by_key(stateline::tracking::domain::StateEvent::entered_at),
        "history is not ordered by entry time"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_run_reaches_completion_with_results_per_state(
    service: TestService,
) -> Result<(), eyre::Report> {
    let task_id = service
        .create_task(
            CreateTaskRequest::new("run-1", "document-review", "Review the quarterly draft")
                .with_workflow_id("wf-review"),
        )
        .await?;
    eyre::ensure!(task_id.as_str() == "run-1", "unexpected task identifier");

    service
        .advance_state(
            "run-1",
            AdvanceStateRequest::new("processing").with_result("draft collected"),
        )
        .await?;
    service
        .advance_state(
            "run-1",
            AdvanceStateRequest::new("completion").with_result("review published"),
        )
        .await?;

    let detail = service
        .get_task("run-1")
        .await?
        .ok_or_else(|| eyre::eyre!("task should exist"))?;

    eyre::ensure!(detail.task().is_complete(), "task should be complete");
    eyre::ensure!(
        detail.history().len() == 3,
        "expected three history entries, found {}",
        detail.history().len()
    );
    assert_consistent_history(&detail)?;

    let initial = StateName::new("initial")?;
    let processing = StateName::new("processing")?;
    eyre::ensure!(
        detail.payload().results().get(&initial).map(String::as_str) == Some("draft collected"),
        "result for the initial state is missing"
    );
    eyre::ensure!(
        detail
            .payload()
            .results()
            .get(&processing)
            .map(String::as_str)
            == Some("review published"),
        "result for the processing state is missing"
    );

    let summaries = service
        .list_tasks(TaskListQuery::new().with_workflow_id("wf-review"))
        .await?;
    eyre::ensure!(summaries.len() == 1, "expected a single summary");
    let summary = summaries
        .first()
        .ok_or_else(|| eyre::eyre!("expected at least one summary"))?;
    eyre::ensure!(summary.is_complete, "summary should be complete");
    eyre::ensure!(
        summary.current_state.as_str() == "completion",
        "summary should sit in the completion state"
    );
    Ok(())
}
