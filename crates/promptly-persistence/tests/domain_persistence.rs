use promptly_domain::{compile_spec_to_prompt, CompiledPromptRecord, Doc, DomainError, DomainRepository, DomainStubs,
                      Evaluation, EvaluationDraft, NewRun, OutcomeCandidate, OutcomeRun, Run, RunFilter, RunStatus, Share,
                      ShareMode, Spec, SpecFilter, DEMO_USER_ID};
use promptly_persistence::{Database, DieselDomainRepository};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

struct TempDb {
  path: PathBuf,
  repo: DieselDomainRepository,
}

impl Drop for TempDb {
  fn drop(&mut self) {
    let _ = std::fs::remove_file(&self.path);
  }
}

fn temp_repo() -> TempDb {
  let path = std::env::temp_dir().join(format!("promptly_test_{}.db", Uuid::new_v4()));
  let db = Database::open(path.to_str().unwrap()).expect("open db");
  TempDb { path, repo: DieselDomainRepository::new(db) }
}

#[test]
fn migrations_seed_demo_user_and_users_are_unique_by_email() {
  let t = temp_repo();
  assert!(t.repo.get_user(DEMO_USER_ID).unwrap().is_some());
  let a = t.repo.ensure_user("Writer@Example.com").unwrap();
  let b = t.repo.ensure_user("writer@example.com").unwrap();
  assert_eq!(a.id, b.id);
  assert_eq!(t.repo.get_user(&a.id).unwrap().unwrap().email, "writer@example.com");
}

#[test]
fn docs_and_shares_lifecycle() {
  let t = temp_repo();
  let user = t.repo.ensure_user("owner@example.com").unwrap();
  let doc = t.repo.create_doc(Doc::new(&user.id, "Notes", "hello").unwrap()).unwrap();

  let mut edited = doc.clone();
  edited.content = "hello again".into();
  edited.version = 2;
  t.repo.update_doc(&edited).unwrap();
  let stored = t.repo.get_doc(&doc.id).unwrap().unwrap();
  assert_eq!(stored.content, "hello again");
  assert_eq!(stored.version, 2);

  let share = t.repo.create_share(Share::new(&doc.id, ShareMode::View, None).unwrap()).unwrap();
  let found = t.repo.get_share_by_token(&share.token).unwrap().unwrap();
  assert_eq!(found.mode, ShareMode::View);

  assert_eq!(t.repo.list_docs(&user.id).unwrap().len(), 1);
  // otro usuario no puede borrarlo
  assert!(!t.repo.delete_doc(&doc.id, DEMO_USER_ID).unwrap());
  assert!(t.repo.delete_doc(&doc.id, &user.id).unwrap());
  assert!(t.repo.get_doc(&doc.id).unwrap().is_none());
  assert!(t.repo.get_share_by_token(&share.token).unwrap().is_none());
}

#[test]
fn doc_for_unknown_owner_violates_foreign_key() {
  let t = temp_repo();
  let err = t.repo.create_doc(Doc::new("ghost", "Notes", "").unwrap()).unwrap_err();
  assert!(matches!(err, DomainError::ValidationError(_)), "got {:?}", err);
}

#[test]
fn specs_filter_search_and_paginate() {
  let t = temp_repo();
  for title in ["Reading tracker", "Recipe box", "Inventory"] {
    t.repo.create_spec(Spec::create(DEMO_USER_ID, DomainStubs::sample_spec_input(title)).unwrap()).unwrap();
  }
  let mut filter = SpecFilter::for_owner(DEMO_USER_ID);
  let (all, total) = t.repo.list_specs(&filter).unwrap();
  assert_eq!(total, 3);
  assert_eq!(all.len(), 3);

  filter.q = Some("recipe".into());
  let (found, total) = t.repo.list_specs(&filter).unwrap();
  assert_eq!(total, 1);
  assert_eq!(found[0].title, "Recipe box");

  let mut page = SpecFilter::for_owner(DEMO_USER_ID);
  page.limit = 2;
  page.offset = 2;
  let (items, total) = t.repo.list_specs(&page).unwrap();
  assert_eq!(total, 3);
  assert_eq!(items.len(), 1);

  let (none, total) = t.repo.list_specs(&SpecFilter::for_owner("someone-else")).unwrap();
  assert!(none.is_empty());
  assert_eq!(total, 0);
}

#[test]
fn spec_search_treats_wildcards_literally() {
  let t = temp_repo();
  for title in ["100% uptime", "100 days of code", "snake_case linter"] {
    t.repo.create_spec(Spec::create(DEMO_USER_ID, DomainStubs::sample_spec_input(title)).unwrap()).unwrap();
  }
  let mut filter = SpecFilter::for_owner(DEMO_USER_ID);
  filter.q = Some("100%".into());
  let (found, total) = t.repo.list_specs(&filter).unwrap();
  assert_eq!(total, 1);
  assert_eq!(found[0].title, "100% uptime");

  filter.q = Some("E_C".into());
  let (found, _) = t.repo.list_specs(&filter).unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].title, "snake_case linter");

  filter.q = Some("0_d".into());
  assert_eq!(t.repo.list_specs(&filter).unwrap().1, 0);
}

#[test]
fn spec_update_and_compiled_prompts_keep_latest() {
  let t = temp_repo();
  let spec = t.repo
              .create_spec(Spec::create(DEMO_USER_ID, DomainStubs::sample_spec_input("Reading tracker")).unwrap())
              .unwrap();
  let patched = spec.apply_patch(DomainStubs::sample_spec_input("Reading tracker v2")).unwrap();
  t.repo.update_spec(&patched).unwrap();
  let stored = t.repo.get_spec(&spec.id).unwrap().unwrap();
  assert_eq!(stored.title, "Reading tracker v2");
  assert_eq!(stored.version, patched.version);
  assert_eq!(stored.spec, patched.spec);

  let compiled = compile_spec_to_prompt(&stored.spec);
  let first = t.repo.save_compiled_prompt(CompiledPromptRecord::from_compiled(&spec.id, &compiled)).unwrap();
  let second = t.repo.save_compiled_prompt(CompiledPromptRecord::from_compiled(&spec.id, &compiled)).unwrap();
  let latest = t.repo.latest_compiled_prompt(&spec.id).unwrap().unwrap();
  assert_ne!(first.id, second.id);
  assert_eq!(latest.id, second.id);
  assert_eq!(latest.blocks, compiled.blocks);
  assert!(t.repo.latest_compiled_prompt("spec_missing").unwrap().is_none());
}

#[test]
fn runs_errors_and_evaluations() {
  let t = temp_repo();
  let spec = t.repo
              .create_spec(Spec::create(DEMO_USER_ID, DomainStubs::sample_spec_input("Reading tracker")).unwrap())
              .unwrap();
  let run = t.repo
             .create_run(Run::pending(NewRun { spec_id: Some(spec.id.clone()),
                                               model: "gpt-test".into(),
                                               input_blocks: Some(json!({ "agent": "A" })),
                                               ..Default::default() }).unwrap())
             .unwrap();
  t.repo.complete_run_success(&run.id, json!({ "ok": true })).unwrap();
  let stored = t.repo.get_run(&run.id).unwrap().unwrap();
  assert_eq!(stored.status, RunStatus::Success);
  assert_eq!(stored.raw_output, Some(json!({ "ok": true })));
  assert_eq!(stored.input_blocks, Some(json!({ "agent": "A" })));

  let failed = t.repo.create_run(Run::pending(NewRun { model: "gpt-test".into(), ..Default::default() }).unwrap()).unwrap();
  t.repo.complete_run_failure(&failed.id, "llm_error", "timeout", "system").unwrap();
  assert_eq!(t.repo.get_run(&failed.id).unwrap().unwrap().status, RunStatus::Failed);
  let errors = t.repo.list_run_errors(&failed.id).unwrap();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].details, "timeout");

  let only_failed = t.repo
                     .list_runs(&RunFilter { status: Some("failed".into()), ..Default::default() })
                     .unwrap();
  assert_eq!(only_failed.len(), 1);
  assert_eq!(only_failed[0].id, failed.id);

  let cp = t.repo
            .save_compiled_prompt(CompiledPromptRecord::from_compiled(&spec.id, &compile_spec_to_prompt(&spec.spec)))
            .unwrap();
  let draft = EvaluationDraft { score: 7.5,
                                verdict: "good".into(),
                                summary: "Clear".into(),
                                details: json!({ "issues": [] }) };
  t.repo.save_evaluation(Evaluation::new(&spec.id, &cp.id, Some(run.id.clone()), "gpt-test", draft)).unwrap();
  let evals = t.repo.list_evaluations(&spec.id).unwrap();
  assert_eq!(evals.len(), 1);
  assert_eq!(evals[0].score, 7.5);
  assert_eq!(evals[0].details, json!({ "issues": [] }));
}

#[test]
fn outcome_runs_store_candidates_in_order() {
  let t = temp_repo();
  let run = t.repo
             .save_outcome_run(OutcomeRun::new("Write a tagline", 2, Some("gpt-test".into()), json!({ "n": 2 }), json!({})))
             .unwrap();
  let mut second = OutcomeCandidate::new(&run.id, 1, "B");
  second.final_score = Some(6.0);
  second.tests_passed = Some(false);
  t.repo.save_outcome_candidate(second).unwrap();
  t.repo.save_outcome_candidate(OutcomeCandidate::new(&run.id, 0, "A")).unwrap();

  let items = t.repo.list_outcome_candidates(&run.id).unwrap();
  let contents: Vec<&str> = items.iter().map(|c| c.content.as_str()).collect();
  assert_eq!(contents, vec!["A", "B"]);
  assert_eq!(items[1].tests_passed, Some(false));

  let orphan = t.repo.save_outcome_candidate(OutcomeCandidate::new("outcome_run_missing", 0, "x"));
  assert!(orphan.is_err());
}

#[test]
fn outcome_run_reads_back_best_link() {
  let t = temp_repo();
  let mut run = OutcomeRun::new("Write a tagline", 2, None, json!({ "n": 2 }), json!({ "best": { "content": "B" } }));
  run.best_candidate_id = Some("outcome_cand_b".into());
  let saved = t.repo.save_outcome_run(run).unwrap();

  let loaded = t.repo.get_outcome_run(&saved.id).unwrap().unwrap();
  assert_eq!(loaded.best_candidate_id.as_deref(), Some("outcome_cand_b"));
  assert_eq!(loaded.request["n"], 2);
  assert_eq!(loaded.result["best"]["content"], "B");
  assert!(t.repo.get_outcome_run("outcome_run_missing").unwrap().is_none());
}
