mod common;

use common::{broad_questions, choice_questions, harness, synthesized_spec};
use promptly_domain::{DomainRepository, RunFilter, RunStatus, SpecStatus, DEMO_USER_ID};
use promptly_providers::ProviderError;
use promptly_workflow::services::{AnswerControl, AnswerOutcome};
use promptly_workflow::{WizardService, WorkflowError};
use serde_json::json;
use wizard::{AnswerInput, SessionStatus, WizardRepository};

fn answer(id: &str) -> AnswerInput {
  AnswerInput { question_id: id.to_string(), value: json!("ok") }
}

#[tokio::test]
async fn start_runs_both_agents_and_returns_first_batch() {
  let h = harness();
  h.provider.push(broad_questions()).push(choice_questions(7));
  let service = WizardService::new(h.ctx.clone());

  let started = service.start_session(None, "A recipe sharing app", Some("webapp".into())).await.unwrap();
  assert_eq!(started.questions.len(), 5);
  assert!(started.questions.iter().all(|q| q.id.starts_with("q_")));

  // Ids del modelo descartados; propietario por defecto.
  let session = h.wizard.get_session(&started.session_id).unwrap().unwrap();
  assert_eq!(session.owner_id.as_deref(), Some(DEMO_USER_ID));
  assert_eq!(session.status, SessionStatus::Active);
  assert_eq!(h.wizard.list_questions(&started.session_id).unwrap().len(), 7);

  // El agente B recibe los ejes normalizados del agente A.
  let requests = h.provider.requests();
  assert_eq!(requests.len(), 2);
  let payload: serde_json::Value = serde_json::from_str(&requests[1].user).unwrap();
  assert_eq!(payload["broad_questions"][0]["id"], json!("axis_1"));
  assert_eq!(payload["broad_questions"][0]["rationale"], json!(""));
  assert_eq!(payload["broad_questions"][2]["id"], json!("custom"));

  let runs = h.domain.list_runs(&RunFilter::default()).unwrap();
  assert_eq!(runs.len(), 2);
  assert!(runs.iter().all(|r| r.status == RunStatus::Success));
}

#[tokio::test]
async fn failed_generation_marks_session_and_run() {
  let h = harness();
  h.provider.push(broad_questions()).push(json!({ "choice_questions": [] }));
  let service = WizardService::new(h.ctx.clone());

  let err = service.start_session(Some(&h.owner), "Idea", None).await.unwrap_err();
  assert!(matches!(err, WorkflowError::InvalidOutput { .. }));
  assert!(err.is_upstream());

  let runs = h.domain.list_runs(&RunFilter::default()).unwrap();
  let failed: Vec<_> = runs.iter().filter(|r| r.status == RunStatus::Failed).collect();
  assert_eq!(failed.len(), 1);
  let errors = h.domain.list_run_errors(&failed[0].id).unwrap();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].error_type, "runtime_exception");
  assert_eq!(errors[0].detected_by, "system");
}

#[tokio::test]
async fn disabled_provider_is_reported() {
  let h = harness();
  h.provider.push_error(ProviderError::Disabled);
  let service = WizardService::new(h.ctx.clone());
  let err = service.start_session(None, "Idea", None).await.unwrap_err();
  assert!(err.is_llm_disabled());
}

#[tokio::test]
async fn blank_description_is_rejected_before_any_call() {
  let h = harness();
  let service = WizardService::new(h.ctx.clone());
  let err = service.start_session(None, "   ", None).await.unwrap_err();
  assert!(matches!(err, WorkflowError::Validation(_)));
  assert!(h.provider.requests().is_empty());
}

#[tokio::test]
async fn answer_back_skip_and_finalize() {
  let h = harness();
  h.provider.push(broad_questions()).push(choice_questions(3)).push(synthesized_spec());
  let service = WizardService::new(h.ctx.clone());
  let started = service.start_session(None, "Recipes", Some("webapp".into())).await.unwrap();
  let sid = started.session_id.clone();
  let ids: Vec<String> = started.questions.iter().map(|q| q.id.clone()).collect();

  match service.answer(&sid, &[answer(&ids[0])], None).unwrap() {
    AnswerOutcome::Batch(b) => assert_eq!(b.questions.len(), 2),
    other => panic!("unexpected {:?}", other),
  }
  match service.answer(&sid, &[answer(&ids[0])], Some(AnswerControl::Back)).unwrap() {
    AnswerOutcome::Batch(b) => assert_eq!(b.message.as_deref(), Some("Moved back to question 1")),
    other => panic!("unexpected {:?}", other),
  }
  match service.answer(&sid, &[answer(&ids[1])], Some(AnswerControl::Skip)).unwrap() {
    AnswerOutcome::Batch(b) => assert!(!b.done),
    other => panic!("unexpected {:?}", other),
  }
  let all: Vec<AnswerInput> = vec![answer(&ids[0]), answer(&ids[2])];
  match service.answer(&sid, &all, None).unwrap() {
    AnswerOutcome::ReadyToFinalize { next } => assert_eq!(next, format!("/api/question-sessions/{}/finalize", sid)),
    other => panic!("unexpected {:?}", other),
  }

  let done = service.finalize(&sid).await.unwrap();
  assert_eq!(done.explanation, "Built from answers");
  assert_eq!(done.compiled_prompt.blocks[0].label, "System Role");

  let spec = h.domain.get_spec(&done.spec_id).unwrap().unwrap();
  assert_eq!(spec.title, "Recipe Hub");
  assert_eq!(spec.status, SpecStatus::Compiled);
  assert_eq!(spec.kind.as_deref(), Some("webapp"));
  assert_eq!(spec.tech_stack, Some(json!({ "frontend": "React" })));
  assert_eq!(spec.session_id.as_deref(), Some(sid.as_str()));
  let latest = h.domain.latest_compiled_prompt(&spec.id).unwrap().unwrap();
  assert_eq!(latest.id, done.compiled_prompt_id);

  let session = h.wizard.get_session(&sid).unwrap().unwrap();
  assert_eq!(session.status, SessionStatus::Completed);
  assert_eq!(session.intent, Some(json!({ "goal": "share recipes" })));

  // Agente C ve las tres preguntas, la omitida con respuesta nula.
  let c_payload: serde_json::Value = serde_json::from_str(&h.provider.requests()[2].user).unwrap();
  assert_eq!(c_payload["qa_pairs"].as_array().unwrap().len(), 3);
  assert_eq!(c_payload["qa_pairs"][1]["answer"], serde_json::Value::Null);

  let again = service.finalize(&sid).await.unwrap_err();
  assert!(matches!(again, WorkflowError::Conflict(_)));
}

#[tokio::test]
async fn finalize_failure_sets_error_status() {
  let h = harness();
  h.provider.push(broad_questions()).push(choice_questions(3)).push(json!({ "spec": "nope" }));
  let service = WizardService::new(h.ctx.clone());
  let started = service.start_session(None, "Recipes", None).await.unwrap();

  let err = service.finalize(&started.session_id).await.unwrap_err();
  assert!(err.is_upstream());
  let session = h.wizard.get_session(&started.session_id).unwrap().unwrap();
  assert_eq!(session.status, SessionStatus::Error);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
  let h = harness();
  let service = WizardService::new(h.ctx.clone());
  assert!(matches!(service.finalize("sess_missing").await, Err(WorkflowError::Wizard(wizard::WizardError::NotFound(_)))));
  assert!(matches!(service.answer("sess_missing", &[answer("q")], None),
                   Err(WorkflowError::Wizard(wizard::WizardError::NotFound(_)))));
}

#[tokio::test]
async fn regenerate_replaces_with_same_type() {
  let h = harness();
  h.provider
   .push(broad_questions())
   .push(choice_questions(4))
   .push(broad_questions())
   .push(choice_questions(5));
  let service = WizardService::new(h.ctx.clone());
  let started = service.start_session(None, "Recipes", None).await.unwrap();
  let target = started.questions[1].clone();

  let regenerated = service.regenerate_question(&started.session_id, &target.id).await.unwrap();
  assert_eq!(regenerated.replaces, target.id);
  assert_eq!(regenerated.origin, "regenerated");
  assert_eq!(regenerated.question.question_type, target.question_type);
  assert_ne!(regenerated.question.id, target.id);

  // La pregunta sustituida deja de estar pendiente.
  let (_, progress) = service.get_session(&started.session_id).unwrap();
  assert_eq!(progress.questions, 4);
  assert_eq!(progress.replaced, 1);

  let missing = service.regenerate_question(&started.session_id, "q_nope").await.unwrap_err();
  assert!(matches!(missing, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn snapshots_round_trip_through_service() {
  let h = harness();
  h.provider.push(broad_questions()).push(choice_questions(3));
  let service = WizardService::new(h.ctx.clone());
  let started = service.start_session(None, "Recipes", None).await.unwrap();

  assert!(service.latest_snapshot(&started.session_id).is_err());
  let snap = service.snapshot(&started.session_id).unwrap();
  let latest = service.latest_snapshot(&started.session_id).unwrap();
  assert_eq!(latest.id, snap.id);
  assert_eq!(latest.snapshot["questions"].as_array().unwrap().len(), 3);
}
