// outcome.rs
//
// Puntuación de candidatos del generador de resultados: pruebas objetivas
// (frases obligatorias/prohibidas, longitud máxima) que restan a la nota del
// modelo, y los registros persistidos de cada ejecución.
use crate::ids::{new_id, now_ts};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const MUST_INCLUDE_PENALTY: f64 = 1.5;
pub const MUST_NOT_INCLUDE_PENALTY: f64 = 2.5;
pub const MAX_LENGTH_PENALTY: f64 = 1.0;
pub const SCORING_VERSION: &str = "v0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutcomeTests {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub must_include: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub must_not_include: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_length: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
  pub passed: bool,
  pub issues: Vec<String>,
  pub penalty: f64,
}

/// Aplica las pruebas al contenido. La comparación de frases no distingue
/// mayúsculas; la longitud se mide en caracteres.
pub fn apply_tests(content: &str, tests: Option<&OutcomeTests>) -> TestReport {
  let tests = match tests {
    Some(t) => t,
    None => return TestReport { passed: true, issues: Vec::new(), penalty: 0.0 },
  };
  let text = content.to_lowercase();
  let mut issues = Vec::new();
  let mut penalty = 0.0;

  for kw in tests.must_include.iter().flatten() {
    if !text.contains(&kw.to_lowercase()) {
      issues.push(format!("Missing required phrase: \"{}\"", kw));
      penalty += MUST_INCLUDE_PENALTY;
    }
  }
  for kw in tests.must_not_include.iter().flatten() {
    if text.contains(&kw.to_lowercase()) {
      issues.push(format!("Contains forbidden phrase: \"{}\"", kw));
      penalty += MUST_NOT_INCLUDE_PENALTY;
    }
  }
  if let Some(max) = tests.max_length {
    let len = content.chars().count() as u64;
    if len > max {
      issues.push(format!("Too long: length {}, max allowed {}", len, max));
      penalty += MAX_LENGTH_PENALTY;
    }
  }

  TestReport { passed: issues.is_empty(), issues, penalty }
}

/// Nota final acotada a 0..=10.
pub fn final_score(llm_score: f64, penalty: f64) -> f64 {
  (llm_score - penalty).clamp(0.0, 10.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
  pub id: String,
  pub content: String,
  pub llm_score: f64,
  pub dimensions: JsonValue,
  pub suggestions: JsonValue,
  pub tests: TestReport,
  pub final_score: f64,
}

/// Primer candidato con la nota final estrictamente mayor.
pub fn pick_best(candidates: &[ScoredCandidate]) -> Option<usize> {
  let mut best: Option<usize> = None;
  for (i, cand) in candidates.iter().enumerate() {
    match best {
      Some(b) if cand.final_score <= candidates[b].final_score => {}
      _ => best = Some(i),
    }
  }
  best
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRun {
  pub id: String,
  pub spec_id: Option<String>,
  pub run_id: Option<String>,
  pub task: String,
  pub input: Option<String>,
  pub style: Option<String>,
  pub constraints: Option<String>,
  pub n: i64,
  pub model: Option<String>,
  pub status: String,
  pub best_candidate_id: Option<String>,
  pub request: JsonValue,
  pub result: JsonValue,
  pub created_at: String,
}

impl OutcomeRun {
  pub fn new(task: &str, n: i64, model: Option<String>, request: JsonValue, result: JsonValue) -> Self {
    Self { id: new_id("outcome_run_", 12),
           spec_id: None,
           run_id: None,
           task: task.to_string(),
           input: None,
           style: None,
           constraints: None,
           n,
           model,
           status: "success".to_string(),
           best_candidate_id: None,
           request,
           result,
           created_at: now_ts() }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCandidate {
  pub id: String,
  pub outcome_run_id: String,
  pub candidate_index: i64,
  pub content: String,
  pub llm_score: Option<f64>,
  pub final_score: Option<f64>,
  pub tests_passed: Option<bool>,
  pub tests: JsonValue,
  pub created_at: String,
}

impl OutcomeCandidate {
  pub fn new(outcome_run_id: &str, candidate_index: i64, content: &str) -> Self {
    Self { id: new_id("cand_", 12),
           outcome_run_id: outcome_run_id.to_string(),
           candidate_index,
           content: content.to_string(),
           llm_score: None,
           final_score: None,
           tests_passed: None,
           tests: JsonValue::Null,
           created_at: now_ts() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_tests_means_no_penalty() {
    let r = apply_tests("anything", None);
    assert!(r.passed);
    assert_eq!(r.penalty, 0.0);
  }

  #[test]
  fn score_is_clamped() {
    assert_eq!(final_score(2.0, 4.0), 0.0);
    assert_eq!(final_score(12.0, 0.0), 10.0);
    assert_eq!(final_score(8.0, 1.5), 6.5);
  }
}
