use promptly_domain::{compile_spec_to_prompt, Run, NewRun};
use promptly_workflow::agents::{BroadQuestionsAgent, ChoiceQuestionsAgent, EnhanceMode, EnhancerAgent, EnhancerOutput,
                                EvaluatorAgent, OutcomeJudgeAgent, SpecSynthesisAgent};
use promptly_workflow::{Agent, WorkflowError};
use serde_json::json;

fn broad_agent() -> BroadQuestionsAgent {
  BroadQuestionsAgent { initial_description: "A habit tracker".into(), kind: None }
}

#[test]
fn broad_questions_need_three_items() {
  let raw = json!({ "broad_questions": [
    { "axis": "users", "question": "Who?" },
    { "axis": "data", "question": "What?" }
  ]});
  let err = broad_agent().parse(&raw).unwrap_err();
  assert!(matches!(err, WorkflowError::InvalidOutput { .. }));
  assert!(err.to_string().contains("at least 3"));
}

#[test]
fn choice_questions_reject_unknown_type() {
  let agent = ChoiceQuestionsAgent { initial_description: "x".into(), kind: None, broad_questions: Vec::new() };
  let raw = json!({ "choice_questions": [
    { "type": "essay", "content": "a" },
    { "type": "yes_no", "content": "b" },
    { "type": "yes_no", "content": "c" }
  ]});
  assert!(agent.parse(&raw).is_err());
}

#[test]
fn spec_synthesis_requires_object_spec() {
  let agent = SpecSynthesisAgent { initial_description: "x".into(), kind: None, qa_pairs: Vec::new() };
  let ok = agent.parse(&json!({ "spec": { "title": "T" }, "explanation": "e" })).unwrap();
  assert!(ok.intent.is_none());
  assert_eq!(ok.spec["title"], json!("T"));
  assert!(agent.parse(&json!({ "spec": [1, 2], "explanation": "e" })).is_err());
}

#[test]
fn evaluator_input_blocks_summarise_the_prompt() {
  let spec = json!({ "project_goal": "g" });
  let compiled = compile_spec_to_prompt(&spec);
  let agent = EvaluatorAgent { spec, blocks: compiled.blocks.clone() };
  let blocks = agent.input_blocks();
  assert_eq!(blocks["spec_title"], json!("Untitled"));
  assert_eq!(blocks["prompt_blocks_count"], json!(compiled.blocks.len()));
}

#[test]
fn judge_checks_metric_ranges_and_keeps_extra_fields() {
  let run = Run::pending(NewRun { model: "m".into(), ..Default::default() }).unwrap();
  let agent = OutcomeJudgeAgent { run, spec: json!({}), outcome_spec_id: "spec_1".into() };

  let ok = agent.parse(&json!({
    "score": 9, "verdict": "pass", "summary": "fine", "confidence": 0.8,
    "metrics": [{ "name": "format", "score": 10, "weight": 2 }]
  })).unwrap();
  assert_eq!(ok.extra["confidence"], json!(0.8));
  assert_eq!(ok.metrics.unwrap()[0].extra["weight"], json!(2));

  let bad = agent.parse(&json!({
    "score": 9, "verdict": "pass", "summary": "fine",
    "metrics": [{ "name": "format", "score": 11 }]
  }));
  assert!(bad.is_err());
  assert!(agent.parse(&json!({ "score": 5, "verdict": "maybe", "summary": "?" })).is_err());
}

#[test]
fn enhancer_modes_parse_their_own_shapes() {
  let structure = EnhancerAgent::new(EnhanceMode::Structure, "do it");
  match structure.parse(&json!({ "original": "do it", "enhanced": "Do it well." })).unwrap() {
    EnhancerOutput::Enhanced(e) => assert_eq!(e.enhanced, "Do it well."),
    other => panic!("unexpected {:?}", other),
  }

  let score = EnhancerAgent::new(EnhanceMode::Score, "do it");
  assert!(score.parse(&json!({ "prompt": "do it", "score": 12 })).is_err());
  match score.parse(&json!({ "prompt": "do it", "score": 6.5 })).unwrap() {
    EnhancerOutput::Score(s) => assert!(s.dimensions.is_none()),
    other => panic!("unexpected {:?}", other),
  }

  // El payload incluye el modo en minúsculas.
  assert_eq!(score.user_payload(), json!({ "prompt": "do it", "mode": "score" }));
  assert_eq!(score.request(None).user, json!({ "prompt": "do it", "mode": "score" }).to_string());
}
