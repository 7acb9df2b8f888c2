use crate::agents::{CandidateGenerator, EnhanceMode, EnhancerAgent, EnhancerOutput};
use crate::context::WorkflowContext;
use crate::errors::WorkflowError;
use promptly_domain::{apply_tests, final_score, pick_best, OutcomeCandidate, OutcomeRun, OutcomeTests,
                      ScoredCandidate, SCORING_VERSION};
use promptly_providers::ProviderError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

pub const DEFAULT_CANDIDATES: u32 = 4;
pub const MIN_CANDIDATES: u32 = 2;
pub const MIN_MAX_TOKENS: u32 = 64;
pub const MAX_MAX_TOKENS: u32 = 4096;
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Petición del generador de resultados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutcomeRequest {
  #[serde(default)]
  pub task: String,
  #[serde(default)]
  pub input: Option<String>,
  #[serde(default)]
  pub style: Option<String>,
  #[serde(default)]
  pub constraints: Option<String>,
  #[serde(default)]
  pub n: Option<i64>,
  #[serde(default)]
  pub temperature: Option<f64>,
  #[serde(default, rename = "maxTokens")]
  pub max_tokens: Option<i64>,
  #[serde(default)]
  pub tests: Option<OutcomeTests>,
}

/// Petición ya validada, con `n` resuelto.
#[derive(Debug, Clone, PartialEq)]
struct ValidRequest {
  task: String,
  input: Option<String>,
  style: Option<String>,
  constraints: Option<String>,
  n: u32,
  temperature: Option<f64>,
  max_tokens: Option<u32>,
  tests: Option<OutcomeTests>,
}

impl OutcomeRequest {
  fn validate(self, max_candidates: u32) -> Result<ValidRequest, WorkflowError> {
    if self.task.is_empty() {
      return Err(WorkflowError::Validation("task is required".into()));
    }
    let max_n = max_candidates.max(MIN_CANDIDATES);
    let n = self.n.unwrap_or(DEFAULT_CANDIDATES as i64);
    if n < MIN_CANDIDATES as i64 || n > max_n as i64 {
      return Err(WorkflowError::Validation(format!("n must be between {} and {}", MIN_CANDIDATES, max_n)));
    }
    if let Some(t) = self.temperature {
      if !(0.0..=MAX_TEMPERATURE).contains(&t) {
        return Err(WorkflowError::Validation(format!("temperature must be between 0 and {}", MAX_TEMPERATURE)));
      }
    }
    let max_tokens = match self.max_tokens {
      Some(m) if m < MIN_MAX_TOKENS as i64 || m > MAX_MAX_TOKENS as i64 => {
        return Err(WorkflowError::Validation(format!("maxTokens must be between {} and {}",
                                                     MIN_MAX_TOKENS, MAX_MAX_TOKENS)))
      }
      Some(m) => Some(m as u32),
      None => None,
    };
    if let Some(tests) = &self.tests {
      if tests.max_length == Some(0) {
        return Err(WorkflowError::Validation("tests.max_length must be positive".into()));
      }
    }
    Ok(ValidRequest { task: self.task,
                      input: self.input,
                      style: self.style,
                      constraints: self.constraints,
                      n: n as u32,
                      temperature: self.temperature,
                      max_tokens,
                      tests: self.tests })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationMeta {
  #[serde(rename = "scoringVersion")]
  pub scoring_version: String,
  #[serde(rename = "modelUsed")]
  pub model_used: String,
}

/// Resultado completo de una generación.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeGeneration {
  pub outcome_run_id: String,
  pub request: JsonValue,
  pub candidates: Vec<ScoredCandidate>,
  pub best: ScoredCandidate,
  pub meta: GenerationMeta,
}

/// Generación orientada a resultados: genera N candidatos, puntúa cada uno
/// con el agente de puntuación, aplica las pruebas objetivas y elige el
/// mejor.
#[derive(Clone)]
pub struct OutcomeService {
  ctx: WorkflowContext,
}

impl OutcomeService {
  pub fn new(ctx: WorkflowContext) -> Self {
    Self { ctx }
  }

  pub async fn generate(&self, request: OutcomeRequest) -> Result<OutcomeGeneration, WorkflowError> {
    let req = request.validate(self.ctx.config.max_candidates)?;
    if !self.ctx.llm_enabled() {
      return Err(ProviderError::Disabled.into());
    }
    let model = self.ctx.config.outcome_model_for(None);
    let runner = self.ctx.runner();

    let generator = CandidateGenerator { task: req.task.clone(),
                                         input: req.input.clone(),
                                         style: req.style.clone(),
                                         constraints: req.constraints.clone(),
                                         n: req.n,
                                         temperature: req.temperature,
                                         max_tokens: req.max_tokens };
    let generated = runner.run_unlogged(&generator, Some(&model)).await?;

    let mut scored = Vec::with_capacity(generated.len());
    for cand in generated {
      let score = match runner.run_unlogged(&EnhancerAgent::new(EnhanceMode::Score, &cand.content), None).await? {
        EnhancerOutput::Score(s) => s,
        _ => return Err(WorkflowError::invalid_output("score", "unexpected enhancer output")),
      };
      let tests = apply_tests(&cand.content, req.tests.as_ref());
      let final_score = final_score(score.score, tests.penalty);
      scored.push(ScoredCandidate { id: cand.id,
                                    content: cand.content,
                                    llm_score: score.score,
                                    dimensions: serde_json::to_value(score.dimensions.unwrap_or_default())?,
                                    suggestions: serde_json::to_value(score.suggestions.unwrap_or_default())?,
                                    tests,
                                    final_score });
    }

    let best_index =
      pick_best(&scored).ok_or_else(|| WorkflowError::invalid_output("CANDIDATES", "No candidates generated"))?;
    let best = scored[best_index].clone();
    let request_json = json!({
      "task": req.task,
      "input": req.input,
      "style": req.style,
      "constraints": req.constraints,
      "n": req.n,
      "tests": req.tests,
    });
    let meta = GenerationMeta { scoring_version: SCORING_VERSION.to_string(), model_used: model.clone() };

    let outcome_run_id = self.persist(&req, &model, &request_json, &scored, best_index, &meta)?;
    log::info!("generación {} con {} candidatos, mejor {} ({})", outcome_run_id, scored.len(), best.id, best.final_score);
    Ok(OutcomeGeneration { outcome_run_id, request: request_json, candidates: scored, best, meta })
  }

  /// Guarda la ejecución y sus candidatos. El mejor se enlaza por su
  /// posición, ya que el modelo puede repetir ids.
  fn persist(&self,
             req: &ValidRequest,
             model: &str,
             request_json: &JsonValue,
             scored: &[ScoredCandidate],
             best_index: usize,
             meta: &GenerationMeta)
             -> Result<String, WorkflowError> {
    let result = json!({ "candidates": scored, "best": scored.get(best_index), "meta": meta });
    let mut run = OutcomeRun::new(&req.task, req.n as i64, Some(model.to_string()), request_json.clone(), result);
    run.input = req.input.clone();
    run.style = req.style.clone();
    run.constraints = req.constraints.clone();

    let rows: Vec<OutcomeCandidate> = scored.iter()
                                            .enumerate()
                                            .map(|(i, c)| {
                                              let mut row = OutcomeCandidate::new(&run.id, i as i64, &c.content);
                                              row.llm_score = Some(c.llm_score);
                                              row.final_score = Some(c.final_score);
                                              row.tests_passed = Some(c.tests.passed);
                                              row.tests = json!(c.tests);
                                              row
                                            })
                                            .collect();
    run.best_candidate_id = rows.get(best_index).map(|row| row.id.clone());

    let run = self.ctx.domain_repo.save_outcome_run(run)?;
    for row in rows {
      self.ctx.domain_repo.save_outcome_candidate(row)?;
    }
    Ok(run.id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn req(task: &str) -> OutcomeRequest {
    OutcomeRequest { task: task.into(), ..Default::default() }
  }

  #[test]
  fn defaults_n_to_four() {
    assert_eq!(req("t").validate(8).unwrap().n, 4);
  }

  #[test]
  fn rejects_out_of_range_fields() {
    assert!(req("").validate(8).is_err());
    assert!(OutcomeRequest { n: Some(9), ..req("t") }.validate(8).is_err());
    assert!(OutcomeRequest { n: Some(6), ..req("t") }.validate(5).is_err());
    assert!(OutcomeRequest { temperature: Some(2.5), ..req("t") }.validate(8).is_err());
    assert!(OutcomeRequest { max_tokens: Some(32), ..req("t") }.validate(8).is_err());
    assert!(OutcomeRequest { max_tokens: Some(64), ..req("t") }.validate(8).is_ok());
  }
}
