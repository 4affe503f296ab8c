//! Diesel schema for workflow task persistence.

diesel::table! {
    /// Task records: one row per tracked workflow instance.
    tasks (task_id) {
        /// Caller-assigned task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Owning workflow identifier.
        #[max_length = 255]
        workflow_id -> Varchar,
        /// Owning workflow name.
        #[max_length = 255]
        workflow_name -> Varchar,
        /// Owning workflow version.
        #[max_length = 50]
        workflow_version -> Varchar,
        /// State the task currently occupies.
        #[max_length = 255]
        current_state -> Varchar,
        /// State whose arrival marks success.
        #[max_length = 255]
        completion_state -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest transition timestamp.
        updated_at -> Timestamptz,
        /// Identity of the creating principal.
        #[max_length = 255]
        creator_id -> Varchar,
        /// Scheduling priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Retry ceiling.
        max_retries -> Int4,
        /// Retries consumed.
        retry_count -> Int4,
        /// Per-state timeout in seconds.
        timeout_seconds -> Int4,
        /// Whether the most recent transition reached completion.
        is_complete -> Bool,
        /// Whether the most recent transition carried an error.
        has_error -> Bool,
    }
}

diesel::table! {
    /// Append-only state history: one row per state a task occupied.
    task_state_events (id) {
        /// Surrogate event identifier.
        id -> Int8,
        /// Owning task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// State the task occupied.
        #[max_length = 255]
        state_name -> Varchar,
        /// When the state was entered.
        entered_at -> Timestamptz,
        /// When the state was exited; null while current.
        exited_at -> Nullable<Timestamptz>,
        /// Whole-second dwell time, computed at exit.
        duration_seconds -> Nullable<Int8>,
        /// Result produced in the state, filled at exit.
        result -> Nullable<Text>,
        /// Whether the state was entered under error.
        has_error -> Bool,
        /// Error message recorded at entry.
        error_message -> Nullable<Text>,
    }
}

diesel::table! {
    /// Task payloads: one row of variable-shaped data per task.
    task_payloads (task_id) {
        /// Owning task identifier.
        #[max_length = 255]
        task_id -> Varchar,
        /// Prompt text supplied at creation.
        prompt -> Text,
        /// Context text supplied at creation.
        context -> Nullable<Text>,
        /// Creation parameters.
        parameters -> Jsonb,
        /// Accumulated results keyed by exited state.
        results -> Jsonb,
        /// Candidate follow-on state names.
        next_states -> Jsonb,
        /// Most recent error report.
        error_details -> Nullable<Jsonb>,
    }
}

diesel::joinable!(task_state_events -> tasks (task_id));
diesel::joinable!(task_payloads -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, task_state_events, task_payloads);
