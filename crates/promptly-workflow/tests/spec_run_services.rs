mod common;

use common::harness;
use promptly_domain::{DomainRepository, NewRun, RunFilter, RunStatus, SpecFilter, SpecInput};
use promptly_providers::ProviderError;
use promptly_workflow::agents::JudgeVerdict;
use promptly_workflow::{RunService, SpecService, WorkflowError};
use serde_json::json;

fn spec_input(title: &str) -> SpecInput {
  serde_json::from_value(json!({
    "title": title,
    "kind": "webapp",
    "tech_stack": { "frontend": "Svelte" },
    "spec": { "title": title, "project_goal": "Track habits", "features": ["streaks"] }
  })).unwrap()
}

fn evaluation(score: u32) -> serde_json::Value {
  json!({
    "score": score,
    "verdict": "pass",
    "summary": "Solid prompt",
    "strengths": ["clear goal"]
  })
}

#[test]
fn create_update_and_ownership() {
  let h = harness();
  let specs = SpecService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();
  assert_eq!(spec.version, 1);

  // Otro usuario no la ve.
  assert!(matches!(specs.get_owned(&spec.id, &h.other), Err(WorkflowError::NotFound(_))));
  assert_eq!(specs.update(&spec.id, &h.owner, spec_input("Habits v2")).unwrap(), 2);
  assert_eq!(specs.get_owned(&spec.id, &h.owner).unwrap().title, "Habits v2");

  let (items, total) = specs.list(&SpecFilter::for_owner(&h.owner)).unwrap();
  assert_eq!(total, 1);
  assert_eq!(items[0].id, spec.id);

  let bad: SpecInput = serde_json::from_value(json!({ "title": "", "spec": {} })).unwrap();
  assert!(matches!(specs.create(&h.owner, bad), Err(WorkflowError::Domain(_))));
}

#[tokio::test]
async fn evaluate_reuses_latest_compiled_prompt() {
  let h = harness();
  h.provider.push(evaluation(82)).push(evaluation(60));
  let specs = SpecService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();

  let compiled = specs.compile(&spec.id, &h.owner).unwrap();
  assert_eq!(compiled.record.blocks, compiled.compiled.blocks);

  let first = specs.evaluate(&spec.id, &h.owner, None).await.unwrap();
  assert_eq!(first.compiled_prompt_id, compiled.record.id);
  assert_eq!(first.score, 82.0);
  assert_eq!(first.model, "gpt-4.1-mini");
  assert_eq!(first.details["strengths"], json!(["clear goal"]));
  assert_eq!(first.details["issues"], json!([]));

  // El run del evaluador queda registrado sin spec y con éxito.
  let run = h.domain.get_run(first.run_id.as_deref().unwrap()).unwrap().unwrap();
  assert_eq!(run.status, RunStatus::Success);
  assert_eq!(run.spec_id, None);
  assert_eq!(run.input_blocks.unwrap()["prompt_blocks_count"], json!(compiled.record.blocks.len()));

  let (recompiled, second) = specs.compile_and_evaluate(&spec.id, &h.owner, Some("gpt-eval")).await.unwrap();
  assert_ne!(recompiled.record.id, compiled.record.id);
  assert_eq!(second.compiled_prompt_id, recompiled.record.id);
  assert_eq!(second.model, "gpt-eval");
  assert_eq!(h.provider.requests()[1].model.as_deref(), Some("gpt-eval"));

  assert_eq!(specs.evaluations(&spec.id, &h.owner).unwrap().len(), 2);
}

#[tokio::test]
async fn evaluate_without_compiled_prompt_compiles_first() {
  let h = harness();
  h.provider.push(evaluation(70));
  let specs = SpecService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();

  let eval = specs.evaluate(&spec.id, &h.owner, None).await.unwrap();
  let latest = h.domain.latest_compiled_prompt(&spec.id).unwrap().unwrap();
  assert_eq!(eval.compiled_prompt_id, latest.id);
}

#[tokio::test]
async fn evaluator_score_out_of_range_fails_the_run() {
  let h = harness();
  h.provider.push(evaluation(140));
  let specs = SpecService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();

  let err = specs.evaluate(&spec.id, &h.owner, None).await.unwrap_err();
  assert!(matches!(err, WorkflowError::InvalidOutput { .. }));
  assert!(specs.evaluations(&spec.id, &h.owner).unwrap().is_empty());
  let runs = h.domain.list_runs(&RunFilter::default()).unwrap();
  assert_eq!(runs[0].status, RunStatus::Failed);
}

#[tokio::test]
async fn evaluate_with_llm_disabled() {
  let h = harness();
  h.provider.push_error(ProviderError::Disabled);
  let specs = SpecService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();
  assert!(specs.evaluate(&spec.id, &h.owner, None).await.unwrap_err().is_llm_disabled());
}

#[test]
fn run_errors_are_classified_and_fail_the_run() {
  let h = harness();
  let runs = RunService::new(h.ctx.clone());
  let run = runs.create(NewRun { model: "gpt-x".into(), ..Default::default() }).unwrap();
  assert_eq!(run.status, RunStatus::Pending);

  let classified = runs.add_error(&run.id, None, "ENOENT: no such file or directory", None).unwrap();
  assert_eq!(classified.error_type, "missing_file");
  assert_eq!(classified.detected_by, "user");
  let explicit = runs.add_error(&run.id, Some("schema_error".into()), "bad payload", Some("ci".into())).unwrap();
  assert_eq!(explicit.detected_by, "ci");

  assert_eq!(runs.get(&run.id).unwrap().status, RunStatus::Failed);
  assert_eq!(runs.errors(&run.id).unwrap().len(), 2);
  assert!(matches!(runs.add_error("run_missing", None, "x", None), Err(WorkflowError::NotFound(_))));
  assert!(matches!(runs.create(NewRun::default()), Err(WorkflowError::Domain(_))));
}

#[test]
fn repair_plan_uses_compiled_blocks_of_the_run_spec() {
  let h = harness();
  let specs = SpecService::new(h.ctx.clone());
  let runs = RunService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();
  let compiled = specs.compile(&spec.id, &h.owner).unwrap();

  let run = runs.create(NewRun { spec_id: Some(spec.id.clone()), model: "gpt-x".into(), ..Default::default() })
                .unwrap();
  runs.add_error(&run.id, Some("route_mismatch".into()), "GET /api/x returned 404", None).unwrap();

  let plan = runs.repair_plan(&run.id).unwrap();
  assert!(plan.summary.starts_with("Found 1 error(s): [route_mismatch]"));
  assert!(!plan.suggested_changes.is_empty());
  assert_eq!(plan.new_prompt_blocks, compiled.record.blocks);

  let bare = runs.create(NewRun { model: "gpt-x".into(), ..Default::default() }).unwrap();
  let plan = runs.repair_plan(&bare.id).unwrap();
  assert_eq!(plan.summary, "No errors found for this run");
  assert!(plan.new_prompt_blocks.is_empty());
}

#[tokio::test]
async fn outcome_check_stores_run_and_metrics() {
  let h = harness();
  let specs = SpecService::new(h.ctx.clone());
  let runs = RunService::new(h.ctx.clone());
  let spec = specs.create(&h.owner, spec_input("Habits")).unwrap();
  let run = runs.create(NewRun { model: "gpt-x".into(), ..Default::default() }).unwrap();

  h.provider.push(json!({
    "score": 7.5,
    "verdict": "needs_work",
    "summary": "Mostly there",
    "metrics": [
      { "name": "correctness", "score": 8, "passed": true },
      { "name": "completeness", "score": 6, "passed": false, "details": "missing streaks" }
    ],
    "details": { "notes": "check edge cases" }
  }));

  let check = runs.outcome_check(&run.id, &spec.id, None).await.unwrap();
  assert_eq!(check.outcome_run.run_id, run.id);
  assert_eq!(check.outcome_run.outcome_spec_id, spec.id);
  assert_eq!(check.outcome_run.verdict, JudgeVerdict::NeedsWork);
  assert_eq!(check.outcome_run.status, "success");
  assert_eq!(check.metrics.len(), 2);
  assert_eq!(check.metrics[1].details.as_deref(), Some("missing streaks"));

  let stored = h.domain.list_outcome_candidates(&check.outcome_run.id).unwrap();
  assert_eq!(stored.len(), 2);
  assert_eq!(stored[0].content, "correctness");
  assert_eq!(stored[1].tests_passed, Some(false));

  // El run del juez apunta a la spec evaluada.
  let judge_runs = h.domain.list_runs(&RunFilter { spec_id: Some(spec.id.clone()), ..Default::default() }).unwrap();
  assert_eq!(judge_runs.len(), 1);
  assert_eq!(judge_runs[0].status, RunStatus::Success);
}

#[tokio::test]
async fn outcome_check_validates_inputs() {
  let h = harness();
  let runs = RunService::new(h.ctx.clone());
  let run = runs.create(NewRun { model: "gpt-x".into(), ..Default::default() }).unwrap();

  assert!(matches!(runs.outcome_check(&run.id, " ", None).await, Err(WorkflowError::Validation(_))));
  match runs.outcome_check(&run.id, "spec_missing", None).await {
    Err(WorkflowError::NotFound(msg)) => assert_eq!(msg, "Outcome spec not found: spec_missing"),
    other => panic!("unexpected {:?}", other.map(|c| c.outcome_run.id)),
  }
  assert!(h.provider.requests().is_empty());
}

#[test]
fn spec_owner_must_be_a_registered_user() {
  let h = harness();
  let specs = SpecService::new(h.ctx.clone());
  assert!(matches!(specs.create("ghost", spec_input("Habits")), Err(WorkflowError::Domain(_))));
  assert_eq!(specs.list(&SpecFilter::for_owner("ghost")).unwrap().1, 0);
}
