use promptly_persistence::{Database, DieselWizardRepository};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use wizard::{AnswerInput, QuestionDraft, QuestionSession, QuestionType, SessionStatus, WizardEngine, WizardError,
             WizardRepository};

fn temp_engine() -> (std::path::PathBuf, WizardEngine<DieselWizardRepository>) {
  let path = std::env::temp_dir().join(format!("promptly_wizard_{}.db", Uuid::new_v4()));
  let db = Database::open(path.to_str().unwrap()).expect("open db");
  (path, WizardEngine::new(Arc::new(DieselWizardRepository::new(db))))
}

fn drafts(n: usize) -> Vec<QuestionDraft> {
  (0..n).map(|i| QuestionDraft { question_type: QuestionType::ShortText,
                                 content: format!("Question {}", i + 1),
                                 options: None })
        .collect()
}

#[test]
fn session_questions_and_answers_round_trip_through_sqlite() {
  let (path, engine) = temp_engine();
  let session = QuestionSession::new(Some("demo-user".into()), "A reading tracker", Some("webapp".into()));
  engine.open_session(&session).unwrap();
  let questions = engine.add_questions(&session.id, drafts(3)).unwrap();
  assert_eq!(questions.len(), 3);

  let batch = engine.pending_batch(&session.id).unwrap();
  assert_eq!(batch.len(), 3);

  let answers = vec![AnswerInput { question_id: questions[0].id.clone(), value: json!("first") },
                     AnswerInput { question_id: questions[1].id.clone(), value: json!("second") }];
  let outcome = engine.answer(&session.id, &answers).unwrap();
  assert!(!outcome.done);

  // responder de nuevo reemplaza la respuesta previa
  engine.answer(&session.id, &[AnswerInput { question_id: questions[0].id.clone(), value: json!("changed") }])
        .unwrap();
  let stored = engine.repository().list_answers(&session.id).unwrap();
  assert_eq!(stored.len(), 2);
  let pairs = engine.qa_pairs(&session.id).unwrap();
  assert_eq!(pairs.len(), 3);
  assert_eq!(pairs[0]["answer"], json!("changed"));
  assert_eq!(pairs[2]["answer"], json!(null));

  let done = engine.answer(&session.id, &[AnswerInput { question_id: questions[2].id.clone(), value: json!("x") }])
                   .unwrap();
  assert!(done.done);
  let reloaded = engine.session(&session.id).unwrap();
  assert_eq!(reloaded.status, SessionStatus::ReadyToFinalize);
  let _ = std::fs::remove_file(path);
}

#[test]
fn skip_replace_and_snapshots_persist() {
  let (path, engine) = temp_engine();
  let session = QuestionSession::new(None, "A budgeting app", None);
  engine.open_session(&session).unwrap();
  let questions = engine.add_questions(&session.id, drafts(2)).unwrap();

  engine.skip(&session.id, &questions[0].id).unwrap();
  let replacement = engine.replace_question(&session.id,
                                            &questions[1].id,
                                            QuestionDraft { question_type: QuestionType::YesNo,
                                                            content: "Need offline mode?".into(),
                                                            options: None })
                          .unwrap();
  assert_eq!(replacement.order_index, questions[1].order_index);

  let actions = engine.repository().list_actions(&session.id).unwrap();
  assert_eq!(actions.len(), 2);
  assert_eq!(actions[0].skipped_question(), Some(questions[0].id.as_str()));

  let pending: Vec<String> = engine.pending_batch(&session.id).unwrap().into_iter().map(|q| q.id).collect();
  assert_eq!(pending, vec![replacement.id.clone()]);

  assert!(matches!(engine.latest_snapshot(&session.id), Err(WizardError::NotFound(_))));
  engine.snapshot(&session.id).unwrap();
  let snap = engine.latest_snapshot(&session.id).unwrap();
  assert_eq!(snap.snapshot["session"]["id"], json!(session.id));
  let _ = std::fs::remove_file(path);
}

#[test]
fn complete_session_stores_results() {
  let (path, engine) = temp_engine();
  let session = QuestionSession::new(None, "A chat bot", None);
  engine.open_session(&session).unwrap();
  engine.repository()
        .complete_session(&session.id,
                          Some(json!({ "goal": "support" })),
                          json!({ "project_goal": "support" }),
                          json!({ "blocks": [] }),
                          Some("done".into()))
        .unwrap();
  let stored = engine.session(&session.id).unwrap();
  assert_eq!(stored.status, SessionStatus::Completed);
  assert_eq!(stored.spec, Some(json!({ "project_goal": "support" })));
  assert_eq!(stored.explanation.as_deref(), Some("done"));

  let missing = engine.repository().set_status("sess_missing", SessionStatus::Error);
  assert!(matches!(missing, Err(WizardError::NotFound(_))));
  let _ = std::fs::remove_file(path);
}
