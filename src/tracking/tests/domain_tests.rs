//! Domain-focused tests for the task transition algebra.

use crate::tracking::domain::{
    ErrorReport, NewTaskRecord, Priority, StateChange, StateEvent, StateName, Task, TaskId,
    TaskPayload, TaskSettings, TrackingDomainError, WorkflowId, WorkflowRef,
};
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::Map;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn sample_task(clock: &DefaultClock) -> Task {
    let workflow = WorkflowRef::new(
        WorkflowId::new("wf-1").expect("valid workflow id"),
        "document-review",
        "1.0",
    )
    .expect("valid workflow ref");
    Task::new(
        TaskId::new("task-1").expect("valid task id"),
        workflow,
        StateName::new("initial").expect("valid state"),
        StateName::new("completion").expect("valid state"),
        TaskSettings::default(),
        clock,
    )
}

fn empty_payload() -> TaskPayload {
    TaskPayload::new("Review the draft".to_owned(), None, Map::new(), vec![], None)
}

#[rstest]
#[case("")]
#[case("   ")]
fn task_id_rejects_blank_values(#[case] raw: &str) {
    assert_eq!(TaskId::new(raw), Err(TrackingDomainError::EmptyTaskId));
}

#[rstest]
fn task_id_trims_surrounding_whitespace() {
    let id = TaskId::new("  task-42  ").expect("valid task id");
    assert_eq!(id.as_str(), "task-42");
}

#[rstest]
fn task_id_rejects_values_wider_than_the_persisted_column() {
    let raw = "x".repeat(256);
    assert_eq!(
        TaskId::new(raw),
        Err(TrackingDomainError::TaskIdTooLong(256))
    );
}

#[rstest]
#[case("low", Priority::Low)]
#[case("normal", Priority::Normal)]
#[case("high", Priority::High)]
fn priority_parses_known_names(#[case] raw: &str, #[case] expected: Priority) {
    let parsed = Priority::try_from(raw).expect("known priority");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.as_str(), raw);
}

#[rstest]
fn priority_rejects_unknown_names() {
    assert!(Priority::try_from("urgent").is_err());
}

#[rstest]
fn open_event_has_no_exit_fields() {
    let event = StateEvent::open(StateName::new("initial").expect("valid state"), at(100), None);

    assert!(event.is_open());
    assert_eq!(event.exited_at(), None);
    assert_eq!(event.duration_seconds(), None);
    assert_eq!(event.result(), None);
    assert!(!event.has_error());
}

#[rstest]
fn open_event_copies_error_message_from_report() {
    let report = ErrorReport::new("upstream timeout");
    let event = StateEvent::open(
        StateName::new("processing").expect("valid state"),
        at(100),
        Some(&report),
    );

    assert!(event.has_error());
    assert_eq!(event.error_message(), Some("upstream timeout"));
}

#[rstest]
fn seal_records_exit_time_duration_and_result() {
    let mut event =
        StateEvent::open(StateName::new("initial").expect("valid state"), at(100), None);
    event.seal(at(190), Some("draft approved".to_owned()));

    assert!(!event.is_open());
    assert_eq!(event.exited_at(), Some(at(190)));
    assert_eq!(event.duration_seconds(), Some(90));
    assert_eq!(event.result(), Some("draft approved"));
}

#[rstest]
fn seal_clamps_negative_durations_to_zero() {
    let mut event =
        StateEvent::open(StateName::new("initial").expect("valid state"), at(100), None);
    event.seal(at(40), None);

    assert_eq!(event.duration_seconds(), Some(0));
}

#[rstest]
fn task_new_starts_in_the_initial_state_with_flags_down(clock: DefaultClock) {
    let task = sample_task(&clock);

    assert_eq!(task.current_state().as_str(), "initial");
    assert_eq!(task.created_at(), task.updated_at());
    assert_eq!(task.retry_count(), 0);
    assert!(!task.is_complete());
    assert!(!task.has_error());
}

#[rstest]
fn task_new_leaves_flags_down_when_initial_equals_completion(clock: DefaultClock) {
    let workflow = WorkflowRef::new(
        WorkflowId::new("wf-1").expect("valid workflow id"),
        "single-state",
        "1.0",
    )
    .expect("valid workflow ref");
    let task = Task::new(
        TaskId::new("task-eq").expect("valid task id"),
        workflow,
        StateName::new("done").expect("valid state"),
        StateName::new("done").expect("valid state"),
        TaskSettings::default(),
        &clock,
    );

    assert!(!task.is_complete());
}

#[rstest]
fn apply_transition_updates_state_timestamp_and_flags(clock: DefaultClock) {
    let mut task = sample_task(&clock);
    let change = StateChange::new(StateName::new("completion").expect("valid state"), at(500));
    task.apply_transition(&change);

    assert_eq!(task.current_state().as_str(), "completion");
    assert_eq!(task.updated_at(), at(500));
    assert!(task.is_complete());
    assert!(!task.has_error());
}

#[rstest]
fn apply_transition_recomputes_error_flag_per_transition(clock: DefaultClock) {
    let mut task = sample_task(&clock);
    let errored = StateChange::new(StateName::new("retrying").expect("valid state"), at(500))
        .with_error(ErrorReport::new("model call failed"));
    task.apply_transition(&errored);
    assert!(task.has_error());

    let recovered = StateChange::new(StateName::new("processing").expect("valid state"), at(600));
    task.apply_transition(&recovered);
    assert!(!task.has_error());
}

#[rstest]
fn record_transition_keys_the_result_by_the_exited_state() {
    let mut payload = empty_payload();
    let exited = StateName::new("initial").expect("valid state");
    let change = StateChange::new(StateName::new("processing").expect("valid state"), at(500))
        .with_result("draft collected");
    payload.record_transition(&exited, &change);

    assert_eq!(
        payload.results().get(&exited).map(String::as_str),
        Some("draft collected")
    );
    assert!(
        !payload
            .results()
            .contains_key(&StateName::new("processing").expect("valid state"))
    );
}

#[rstest]
fn record_transition_without_result_leaves_results_untouched() {
    let mut payload = empty_payload();
    let exited = StateName::new("initial").expect("valid state");
    payload.record_transition(
        &exited,
        &StateChange::new(StateName::new("processing").expect("valid state"), at(500)),
    );

    assert!(payload.results().is_empty());
}

#[rstest]
fn record_transition_replaces_error_details_wholesale() {
    let mut details = Map::new();
    details.insert("attempt".to_owned(), serde_json::json!(1));
    let mut payload = TaskPayload::new(
        "Review the draft".to_owned(),
        None,
        Map::new(),
        vec![],
        Some(ErrorReport::new("seed failure").with_details(details)),
    );

    let exited = StateName::new("initial").expect("valid state");
    let change = StateChange::new(StateName::new("retrying").expect("valid state"), at(500))
        .with_error(ErrorReport::new("second failure"));
    payload.record_transition(&exited, &change);

    let error = payload.error_details().expect("error details present");
    assert_eq!(error.message(), "second failure");
    assert!(error.details().is_empty());
}

#[rstest]
fn record_transition_without_error_keeps_prior_error_details() {
    let mut payload = TaskPayload::new(
        "Review the draft".to_owned(),
        None,
        Map::new(),
        vec![],
        Some(ErrorReport::new("seed failure")),
    );

    let exited = StateName::new("initial").expect("valid state");
    payload.record_transition(
        &exited,
        &StateChange::new(StateName::new("processing").expect("valid state"), at(500)),
    );

    let error = payload.error_details().expect("error details retained");
    assert_eq!(error.message(), "seed failure");
}

#[rstest]
fn new_task_record_opens_an_event_for_the_initial_state(clock: DefaultClock) {
    let task = sample_task(&clock);
    let created_at = task.created_at();
    let record = NewTaskRecord::new(task, empty_payload());

    let opening = record.opening_event();
    assert!(opening.is_open());
    assert_eq!(opening.state_name().as_str(), "initial");
    assert_eq!(opening.entered_at(), created_at);
    assert!(!opening.has_error());
}

#[rstest]
fn new_task_record_opening_event_reflects_an_initial_error(clock: DefaultClock) {
    let task = sample_task(&clock);
    let payload = TaskPayload::new(
        "Review the draft".to_owned(),
        None,
        Map::new(),
        vec![],
        Some(ErrorReport::new("created under error")),
    );
    let record = NewTaskRecord::new(task, payload);

    let opening = record.opening_event();
    assert!(opening.has_error());
    assert_eq!(opening.error_message(), Some("created under error"));
}
