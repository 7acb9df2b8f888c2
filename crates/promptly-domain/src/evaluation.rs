// evaluation.rs
use crate::ids::{new_id, now_ts};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Resultado de evaluar un prompt compilado contra su spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
  pub id: String,
  pub spec_id: String,
  pub compiled_prompt_id: String,
  pub run_id: Option<String>,
  pub model: String,
  pub score: f64,
  pub verdict: String,
  pub summary: String,
  pub details: JsonValue,
  pub created_at: String,
}

/// Campos que produce el agente evaluador antes de persistirse.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDraft {
  pub score: f64,
  pub verdict: String,
  pub summary: String,
  pub details: JsonValue,
}

impl Evaluation {
  pub fn new(spec_id: &str, compiled_prompt_id: &str, run_id: Option<String>, model: &str, draft: EvaluationDraft) -> Self {
    Self { id: new_id("eval_", 12),
           spec_id: spec_id.to_string(),
           compiled_prompt_id: compiled_prompt_id.to_string(),
           run_id,
           model: model.to_string(),
           score: draft.score,
           verdict: draft.verdict,
           summary: draft.summary,
           details: draft.details,
           created_at: now_ts() }
  }
}
