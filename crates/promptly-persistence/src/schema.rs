// Esquema Diesel de la base SQLite. Debe coincidir con
// `migrations/*/up.sql`.
use diesel::allow_tables_to_appear_in_same_query;

diesel::table! {
    users (id) {
        id -> Text,
        email -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    docs (id) {
        id -> Text,
        owner_id -> Text,
        title -> Text,
        content -> Text,
        version -> BigInt,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    shares (id) {
        id -> Text,
        doc_id -> Text,
        token -> Text,
        mode -> Text,
        created_at -> Text,
        expires_at -> Nullable<Text>,
    }
}

diesel::table! {
    specs (id) {
        id -> Text,
        owner_id -> Text,
        project_id -> Nullable<Text>,
        session_id -> Nullable<Text>,
        kind -> Nullable<Text>,
        title -> Text,
        summary -> Nullable<Text>,
        tech_stack -> Nullable<Text>,
        pages -> Nullable<Text>,
        data_model -> Nullable<Text>,
        constraints -> Nullable<Text>,
        spec_json -> Text,
        status -> Nullable<Text>,
        version -> BigInt,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    compiled_prompts (id) {
        id -> Text,
        spec_id -> Text,
        compiled_json -> Text,
        explanation -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    question_sessions (id) {
        id -> Text,
        owner_id -> Nullable<Text>,
        initial_description -> Text,
        kind -> Nullable<Text>,
        status -> Text,
        intent_json -> Nullable<Text>,
        spec_json -> Nullable<Text>,
        compiled_prompt_json -> Nullable<Text>,
        explanation -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    question_questions (id) {
        id -> Text,
        session_id -> Text,
        #[sql_name = "type"]
        question_type -> Text,
        content -> Text,
        options_json -> Nullable<Text>,
        order_index -> BigInt,
    }
}

diesel::table! {
    question_answers (id) {
        id -> Text,
        session_id -> Text,
        question_id -> Text,
        answer_json -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    question_actions (id) {
        id -> Text,
        session_id -> Text,
        action -> Text,
        payload -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    question_snapshots (id) {
        id -> Text,
        session_id -> Text,
        snapshot_json -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    runs (id) {
        id -> Text,
        spec_id -> Nullable<Text>,
        spec_version -> Nullable<Text>,
        model -> Nullable<Text>,
        status -> Text,
        input_blocks -> Nullable<Text>,
        raw_output -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    run_errors (id) {
        id -> Text,
        run_id -> Text,
        error_type -> Nullable<Text>,
        details -> Nullable<Text>,
        detected_by -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    evaluations (id) {
        id -> Text,
        spec_id -> Text,
        compiled_prompt_id -> Text,
        run_id -> Nullable<Text>,
        model -> Nullable<Text>,
        score -> Nullable<Double>,
        verdict -> Nullable<Text>,
        summary -> Nullable<Text>,
        details -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    outcome_runs (id) {
        id -> Text,
        spec_id -> Nullable<Text>,
        run_id -> Nullable<Text>,
        task -> Text,
        input -> Nullable<Text>,
        style -> Nullable<Text>,
        constraints -> Nullable<Text>,
        n -> BigInt,
        model -> Nullable<Text>,
        status -> Text,
        best_candidate_id -> Nullable<Text>,
        request_json -> Nullable<Text>,
        result_json -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    outcome_candidates (id) {
        id -> Text,
        outcome_run_id -> Text,
        candidate_index -> BigInt,
        content -> Text,
        llm_score -> Nullable<Double>,
        final_score -> Nullable<Double>,
        tests_passed -> Nullable<Bool>,
        tests_json -> Nullable<Text>,
        created_at -> Text,
    }
}

allow_tables_to_appear_in_same_query!(users, docs, shares, specs, compiled_prompts, runs, run_errors, evaluations,
                                      outcome_runs, outcome_candidates);
allow_tables_to_appear_in_same_query!(question_sessions,
                                      question_questions,
                                      question_answers,
                                      question_actions,
                                      question_snapshots);
