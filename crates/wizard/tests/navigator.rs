use serde_json::json;
use std::sync::Arc;
use wizard::{AnswerInput, InMemoryWizardRepository, QuestionDraft, QuestionSession, QuestionType, SessionStatus,
             WizardEngine, WizardError, WizardRepository};

fn drafts(n: usize) -> Vec<QuestionDraft> {
  (0..n).map(|i| QuestionDraft { question_type: QuestionType::ShortText,
                                 content: format!("Question {}", i + 1),
                                 options: None })
        .collect()
}

fn setup(n: usize) -> (WizardEngine<InMemoryWizardRepository>, String, Vec<String>) {
  let engine = WizardEngine::new(Arc::new(InMemoryWizardRepository::new()));
  let session = QuestionSession::new(Some("demo-user".into()), "A recipe sharing app", Some("webapp".into()));
  engine.open_session(&session).unwrap();
  let ids = engine.add_questions(&session.id, drafts(n)).unwrap().into_iter().map(|q| q.id).collect();
  (engine, session.id, ids)
}

fn answer(id: &str) -> AnswerInput {
  AnswerInput { question_id: id.to_string(), value: json!("yes") }
}

#[test]
fn batches_of_five_until_ready() {
  let (engine, sid, ids) = setup(7);
  assert_eq!(engine.pending_batch(&sid).unwrap().len(), 5);

  let batch: Vec<AnswerInput> = ids[..5].iter().map(|id| answer(id)).collect();
  let out = engine.answer(&sid, &batch).unwrap();
  assert!(!out.done);
  assert_eq!(out.questions.len(), 2);
  assert_eq!(out.questions[0].id, ids[5]);

  let out = engine.answer(&sid, &[answer(&ids[5]), answer(&ids[6])]).unwrap();
  assert!(out.done);
  assert_eq!(engine.session(&sid).unwrap().status, SessionStatus::ReadyToFinalize);
  let p = engine.progress(&sid).unwrap();
  assert_eq!(p.answered, 7);
  assert_eq!(p.current_index, 7);
}

#[test]
fn unknown_question_rejects_whole_batch() {
  let (engine, sid, ids) = setup(3);
  let err = engine.answer(&sid, &[answer(&ids[0]), answer("q_missing")]).unwrap_err();
  assert_eq!(err, WizardError::Validation("Unknown question_id: q_missing".into()));
  // nada se escribió
  assert_eq!(engine.progress(&sid).unwrap().answered, 0);
}

#[test]
fn answering_again_replaces_previous_value() {
  let (engine, sid, ids) = setup(3);
  engine.answer(&sid, &[answer(&ids[0])]).unwrap();
  engine.answer(&sid, &[AnswerInput { question_id: ids[0].clone(), value: json!("no") }]).unwrap();
  let answers = engine.repository().list_answers(&sid).unwrap();
  assert_eq!(answers.len(), 1);
  assert_eq!(answers[0].value, json!("no"));
  let pairs = engine.qa_pairs(&sid).unwrap();
  assert_eq!(pairs[0]["answer"], json!("no"));
  assert_eq!(pairs[1]["answer"], serde_json::Value::Null);
  assert_eq!(pairs[0]["type"], json!("short_text"));
}

#[test]
fn go_back_reopens_previous_question() {
  let (engine, sid, ids) = setup(3);
  assert_eq!(engine.go_back(&sid).unwrap_err().message(), "Already at the first question");

  engine.answer(&sid, &[answer(&ids[0]), answer(&ids[1]), answer(&ids[2])]).unwrap();
  assert_eq!(engine.session(&sid).unwrap().status, SessionStatus::ReadyToFinalize);

  let out = engine.go_back(&sid).unwrap();
  assert_eq!(out.message.as_deref(), Some("Moved back to question 3"));
  assert_eq!(out.questions.len(), 1);
  assert_eq!(out.questions[0].id, ids[2]);
  assert_eq!(engine.session(&sid).unwrap().status, SessionStatus::Active);
  assert_eq!(engine.progress(&sid).unwrap().current_index, 2);
}

#[test]
fn go_back_jumps_over_skipped_questions() {
  let (engine, sid, ids) = setup(3);
  engine.skip(&sid, &ids[0]).unwrap();
  let err = engine.go_back(&sid).unwrap_err();
  assert_eq!(err.message(), "No previous question available");
  engine.answer(&sid, &[answer(&ids[1])]).unwrap();
  let out = engine.go_back(&sid).unwrap();
  assert_eq!(out.message.as_deref(), Some("Moved back to question 2"));
}

#[test]
fn skip_rules() {
  let (engine, sid, ids) = setup(3);
  assert_eq!(engine.skip(&sid, "q_nope").unwrap_err().message(), "Question not found");
  engine.answer(&sid, &[answer(&ids[0])]).unwrap();
  assert_eq!(engine.skip(&sid, &ids[0]).unwrap_err().message(), "Question already answered");

  let out = engine.skip(&sid, &ids[1]).unwrap();
  assert!(!out.done);
  assert_eq!(out.questions[0].id, ids[2]);
  assert_eq!(engine.progress(&sid).unwrap().skipped, 1);

  let out = engine.skip(&sid, &ids[2]).unwrap();
  assert!(out.done);
  assert_eq!(engine.session(&sid).unwrap().status, SessionStatus::ReadyToFinalize);
}

#[test]
fn skip_wraps_to_earlier_pending() {
  let (engine, sid, ids) = setup(3);
  let out = engine.skip(&sid, &ids[2]).unwrap();
  assert_eq!(out.questions.iter().map(|q| q.id.clone()).collect::<Vec<_>>(), vec![ids[0].clone(), ids[1].clone()]);
}

#[test]
fn replaced_question_stops_being_asked() {
  let (engine, sid, ids) = setup(3);
  let fresh = engine.replace_question(&sid,
                                      &ids[1],
                                      QuestionDraft { question_type: QuestionType::YesNo,
                                                      content: "Do you need offline mode?".into(),
                                                      options: None })
                    .unwrap();
  let batch = engine.pending_batch(&sid).unwrap();
  let batch_ids: Vec<String> = batch.into_iter().map(|q| q.id).collect();
  assert_eq!(batch_ids, vec![ids[0].clone(), fresh.id.clone(), ids[2].clone()]);
  let p = engine.progress(&sid).unwrap();
  assert_eq!(p.questions, 3);
  assert_eq!(p.replaced, 1);
  assert!(engine.replace_question(&sid, "q_nope", drafts(1).remove(0)).is_err());
}

#[test]
fn snapshots_are_saved_and_loaded() {
  let (engine, sid, ids) = setup(2);
  assert!(matches!(engine.latest_snapshot(&sid), Err(WizardError::NotFound(_))));
  engine.answer(&sid, &[answer(&ids[0])]).unwrap();
  let first = engine.snapshot(&sid).unwrap();
  let second = engine.snapshot(&sid).unwrap();
  let latest = engine.latest_snapshot(&sid).unwrap();
  assert_ne!(first.id, second.id);
  assert_eq!(latest.id, second.id);
  assert_eq!(latest.snapshot["questions"].as_array().unwrap().len(), 2);
  assert_eq!(latest.snapshot["answers"].as_array().unwrap().len(), 1);
  assert!(matches!(engine.snapshot("sess_missing"), Err(WizardError::NotFound(_))));
}

#[test]
fn session_ids_and_timestamps_share_the_domain_format() {
  let session = QuestionSession::new(None, "Idea", None);
  assert!(session.id.starts_with("sess_"));
  assert_eq!(session.id.len(), "sess_".len() + 16);
  assert!(promptly_domain::ids::parse_ts(&session.created_at).is_some());
  assert_eq!(session.created_at.len(), promptly_domain::ids::now_ts().len());
}
