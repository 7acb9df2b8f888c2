use promptly_domain::{generate_repair_plan, CompiledPromptRecord, Doc, DocUpdate, DomainError, DomainRepository, DomainStubs,
                      Evaluation, EvaluationDraft, InMemoryDomainRepository, NewRun, Run, RunFilter, RunStatus, Share,
                      ShareMode, Spec, SpecFilter, DEMO_USER_ID};
use serde_json::json;

#[test]
fn ensure_user_is_idempotent_by_email() {
  let repo = InMemoryDomainRepository::new();
  let a = repo.ensure_user("  Ana@Example.com ").unwrap();
  let b = repo.ensure_user("ana@example.com").unwrap();
  assert_eq!(a.id, b.id);
  assert_eq!(a.email, "ana@example.com");
  assert!(matches!(repo.ensure_user("nope"), Err(DomainError::ValidationError(_))));
}

#[test]
fn doc_edit_conflict_merges_and_delete_drops_shares() {
  let repo = InMemoryDomainRepository::new();
  let user = repo.ensure_user("owner@example.com").unwrap();
  let doc = repo.create_doc(Doc::new(&user.id, "Notes", "first").unwrap()).unwrap();

  let applied = match doc.apply_edit(None, Some("second"), 1).unwrap() {
    DocUpdate::Applied(d) => d,
    DocUpdate::Merged(_) => panic!("expected applied"),
  };
  repo.update_doc(&applied).unwrap();
  assert_eq!(applied.version, 2);

  // versión base antigua: se fusiona
  let merged = match applied.apply_edit(Some("Renamed"), Some("third"), 1).unwrap() {
    DocUpdate::Merged(d) => d,
    DocUpdate::Applied(_) => panic!("expected merge"),
  };
  assert_eq!(merged.version, 3);
  assert!(merged.content.starts_with("second\n\n----- MERGED SECTION ("));
  assert!(merged.content.ends_with("third"));

  let share = repo.create_share(Share::new(&doc.id, ShareMode::Edit, None).unwrap()).unwrap();
  assert!(repo.get_share_by_token(&share.token).unwrap().is_some());

  assert!(!repo.delete_doc(&doc.id, "someone-else").unwrap());
  assert!(repo.delete_doc(&doc.id, &user.id).unwrap());
  assert!(repo.get_doc(&doc.id).unwrap().is_none());
  assert!(repo.get_share_by_token(&share.token).unwrap().is_none());
}

#[test]
fn docs_require_existing_owner() {
  let repo = InMemoryDomainRepository::new();
  let orphan = Doc::new("ghost", "Title", "").unwrap();
  assert!(repo.create_doc(orphan).is_err());
  assert!(Doc::new(DEMO_USER_ID, "", "").is_err());
}

#[test]
fn spec_listing_filters_and_paginates() {
  let (repo, first) = DomainStubs::sample_repo().unwrap();
  for i in 0..3 {
    let mut input = DomainStubs::sample_spec_input(&format!("Inventory {}", i));
    input.kind = Some("api".into());
    input.summary = Some("Stock levels".into());
    repo.create_spec(Spec::create(DEMO_USER_ID, input).unwrap()).unwrap();
  }

  let mut filter = SpecFilter::for_owner(DEMO_USER_ID);
  let (_, total) = repo.list_specs(&filter).unwrap();
  assert_eq!(total, 4);

  filter.kind = Some("api".into());
  filter.limit = 2;
  let (page, total) = repo.list_specs(&filter).unwrap();
  assert_eq!(total, 3);
  assert_eq!(page.len(), 2);

  let mut search = SpecFilter::for_owner(DEMO_USER_ID);
  search.q = Some("  READING ".into());
  let (found, _) = repo.list_specs(&search).unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id, first.id);

  let (other, total) = repo.list_specs(&SpecFilter::for_owner("someone")).unwrap();
  assert!(other.is_empty());
  assert_eq!(total, 0);
}

#[test]
fn spec_search_is_literal_and_folds_ascii_only() {
  let repo = InMemoryDomainRepository::new();
  for title in ["100% uptime", "100 days of code", "Ärzte portal"] {
    repo.create_spec(Spec::create(DEMO_USER_ID, DomainStubs::sample_spec_input(title)).unwrap()).unwrap();
  }
  let mut filter = SpecFilter::for_owner(DEMO_USER_ID);
  filter.q = Some("100%".into());
  assert_eq!(repo.list_specs(&filter).unwrap().1, 1);

  filter.q = Some("0_d".into());
  assert_eq!(repo.list_specs(&filter).unwrap().1, 0);

  // Como LIKE en SQLite: "ä" no casa con "Ä".
  filter.q = Some("ärzte".into());
  assert_eq!(repo.list_specs(&filter).unwrap().1, 0);
  filter.q = Some("PORTAL".into());
  assert_eq!(repo.list_specs(&filter).unwrap().1, 1);
}

#[test]
fn spec_patch_bumps_version_and_keeps_columns() {
  let (repo, spec) = DomainStubs::sample_repo().unwrap();
  let mut input = DomainStubs::sample_spec_input("Reading tracker v2");
  input.kind = None;
  input.summary = Some(String::new());
  let next = spec.apply_patch(input).unwrap();
  repo.update_spec(&next).unwrap();
  let loaded = repo.get_spec(&spec.id).unwrap().unwrap();
  assert_eq!(loaded.version, 2);
  assert_eq!(loaded.title, "Reading tracker v2");
  assert_eq!(loaded.kind.as_deref(), Some("webapp"));
  assert_eq!(loaded.summary.as_deref(), Some("Reading tracker"));
}

#[test]
fn run_failure_records_single_error() {
  let repo = InMemoryDomainRepository::new();
  let run = repo.create_run(Run::pending(NewRun { model: "gpt-test".into(), ..Default::default() }).unwrap())
                .unwrap();
  assert_eq!(run.status, RunStatus::Pending);

  repo.complete_run_failure(&run.id, "runtime_exception", "boom", "system").unwrap();
  let loaded = repo.get_run(&run.id).unwrap().unwrap();
  assert_eq!(loaded.status, RunStatus::Failed);
  let errors = repo.list_run_errors(&run.id).unwrap();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].detected_by, "system");

  let plan = generate_repair_plan(None, &errors);
  assert_eq!(plan.summary, "Found 1 error(s): [runtime_exception] boom");

  let other = repo.create_run(Run::pending(NewRun { model: "gpt-test".into(), ..Default::default() }).unwrap())
                  .unwrap();
  repo.complete_run_success(&other.id, json!({"ok": true})).unwrap();

  let failed = repo.list_runs(&RunFilter { status: Some("failed".into()), ..Default::default() }).unwrap();
  assert_eq!(failed.len(), 1);
  let all = repo.list_runs(&RunFilter::default()).unwrap();
  assert_eq!(all.len(), 2);
  assert!(Run::pending(NewRun::default()).is_err());
}

#[test]
fn evaluations_need_compiled_prompt() {
  let (repo, spec) = DomainStubs::sample_repo().unwrap();
  let draft = || EvaluationDraft { score: 80.0,
                                   verdict: "pass".into(),
                                   summary: "fine".into(),
                                   details: json!({}) };
  let missing = Evaluation::new(&spec.id, "cp_missing", None, "m", draft());
  assert!(repo.save_evaluation(missing).is_err());

  let compiled = promptly_domain::compile_spec_to_prompt(&spec.spec);
  let record = repo.save_compiled_prompt(CompiledPromptRecord::from_compiled(&spec.id, &compiled)).unwrap();
  assert_eq!(repo.latest_compiled_prompt(&spec.id).unwrap().unwrap().id, record.id);

  repo.save_evaluation(Evaluation::new(&spec.id, &record.id, None, "m", draft())).unwrap();
  let second = repo.save_evaluation(Evaluation::new(&spec.id, &record.id, None, "m", draft())).unwrap();
  let list = repo.list_evaluations(&spec.id).unwrap();
  assert_eq!(list.len(), 2);
  assert_eq!(list[0].id, second.id);
}
