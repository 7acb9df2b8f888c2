use crate::agent::Agent;
use crate::agents::{JudgeMetric, OutcomeJudgeAgent, OutcomeJudgement};
use crate::context::WorkflowContext;
use crate::errors::WorkflowError;
use promptly_domain::{classify_error, generate_repair_plan, NewRun, OutcomeCandidate, OutcomeRun, RepairPlan, Run,
                      RunError, RunFilter, RunStatus};
use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};

pub const DEFAULT_DETECTED_BY: &str = "user";
pub const OUTCOME_TASK_FALLBACK: &str = "Outcome evaluation";

/// Resumen del resultado de un juicio, tal como lo ve el cliente.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRunSummary {
  pub id: String,
  pub run_id: String,
  pub outcome_spec_id: String,
  pub status: String,
  pub score: f64,
  pub verdict: crate::agents::JudgeVerdict,
  pub summary: String,
  pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
  pub id: String,
  pub name: String,
  pub score: Option<f64>,
  pub passed: Option<bool>,
  pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeCheck {
  pub outcome_run: OutcomeRunSummary,
  pub metrics: Vec<MetricSummary>,
}

/// Registro de runs externos, sus errores, planes de reparación y el juez
/// de resultados.
#[derive(Clone)]
pub struct RunService {
  ctx: WorkflowContext,
}

impl RunService {
  pub fn new(ctx: WorkflowContext) -> Self {
    Self { ctx }
  }

  pub fn create(&self, new_run: NewRun) -> Result<Run, WorkflowError> {
    Ok(self.ctx.domain_repo.create_run(Run::pending(new_run)?)?)
  }

  pub fn get(&self, run_id: &str) -> Result<Run, WorkflowError> {
    self.ctx
        .domain_repo
        .get_run(run_id)?
        .ok_or_else(|| WorkflowError::NotFound("Run not found".into()))
  }

  pub fn list(&self, filter: &RunFilter) -> Result<Vec<Run>, WorkflowError> {
    Ok(self.ctx.domain_repo.list_runs(filter)?)
  }

  /// Registra un error del run. Sin `error_type` se clasifica con la salida
  /// cruda y el detalle; el run pasa a `failed`.
  pub fn add_error(&self,
                   run_id: &str,
                   error_type: Option<String>,
                   details: &str,
                   detected_by: Option<String>)
                   -> Result<RunError, WorkflowError> {
    let run = self.get(run_id)?;
    let error_type = match error_type.filter(|t| !t.is_empty()) {
      Some(t) => t,
      None => classify_error(&run.raw_output_text(), details).error_type.as_str().to_string(),
    };
    let detected_by = detected_by.filter(|d| !d.is_empty()).unwrap_or_else(|| DEFAULT_DETECTED_BY.to_string());
    let error = self.ctx
                    .domain_repo
                    .add_run_error(RunError::new(&run.id, &error_type, details, &detected_by))?;
    if run.status != RunStatus::Failed {
      self.ctx.domain_repo.set_run_status(&run.id, RunStatus::Failed)?;
    }
    Ok(error)
  }

  pub fn errors(&self, run_id: &str) -> Result<Vec<RunError>, WorkflowError> {
    let run = self.get(run_id)?;
    Ok(self.ctx.domain_repo.list_run_errors(&run.id)?)
  }

  /// Plan de reparación con los errores del run y, si el run apunta a una
  /// spec, los bloques de su último prompt compilado.
  pub fn repair_plan(&self, run_id: &str) -> Result<RepairPlan, WorkflowError> {
    let run = self.get(run_id)?;
    let errors = self.ctx.domain_repo.list_run_errors(&run.id)?;
    let compiled = match &run.spec_id {
      Some(spec_id) => self.ctx.domain_repo.latest_compiled_prompt(spec_id)?,
      None => None,
    };
    Ok(generate_repair_plan(compiled.as_ref().map(|c| c.blocks.as_slice()), &errors))
  }

  /// Juzga la salida de un run frente a una spec y guarda el resultado como
  /// un `outcome_run` con un candidato por métrica.
  pub async fn outcome_check(&self,
                             run_id: &str,
                             outcome_spec_id: &str,
                             model: Option<&str>)
                             -> Result<OutcomeCheck, WorkflowError> {
    if outcome_spec_id.trim().is_empty() {
      return Err(WorkflowError::Validation("outcome_spec_id is required".into()));
    }
    if model.map(|m| m.is_empty()).unwrap_or(false) {
      return Err(WorkflowError::Validation("model must not be empty".into()));
    }
    let run = self.get(run_id)?;
    let spec = self.ctx
                   .domain_repo
                   .get_spec(outcome_spec_id)?
                   .ok_or_else(|| WorkflowError::NotFound(format!("Outcome spec not found: {}", outcome_spec_id)))?;

    let model = self.ctx.config.outcome_model_for(model);
    let agent = OutcomeJudgeAgent { run, spec: spec.spec.clone(), outcome_spec_id: spec.id.clone() };
    let request = json!({ "system": agent.system_prompt(), "user": agent.user_payload().to_string() });
    let call = self.ctx.runner().run_logged(&agent, Some(&spec.id), Some(&model)).await?;
    let judgement = call.output;

    let task = spec.inner_title().unwrap_or_else(|| OUTCOME_TASK_FALLBACK.to_string());
    let mut outcome = OutcomeRun::new(&task, 0, Some(call.model.clone()), request, judgement_result(&judgement)?);
    outcome.spec_id = Some(spec.id.clone());
    outcome.run_id = Some(agent.run.id.clone());
    let outcome = self.ctx.domain_repo.save_outcome_run(outcome)?;

    let mut metrics = Vec::new();
    for (i, metric) in judgement.metrics.iter().flatten().enumerate() {
      let mut cand = OutcomeCandidate::new(&outcome.id, i as i64, &metric.name);
      cand.llm_score = metric.score;
      cand.final_score = metric.score;
      cand.tests_passed = metric.passed;
      cand.tests = serde_json::to_value(metric)?;
      match self.ctx.domain_repo.save_outcome_candidate(cand) {
        Ok(saved) => metrics.push(metric_summary(saved.id, metric)),
        Err(e) => log::warn!("no se pudo guardar la métrica {} de {}: {}", metric.name, outcome.id, e),
      }
    }

    log::info!("outcome {} para el run {}: {:?} ({})", outcome.id, agent.run.id, judgement.verdict, judgement.score);
    Ok(OutcomeCheck { outcome_run: OutcomeRunSummary { id: outcome.id,
                                                       run_id: agent.run.id.clone(),
                                                       outcome_spec_id: spec.id,
                                                       status: outcome.status,
                                                       score: judgement.score,
                                                       verdict: judgement.verdict,
                                                       summary: judgement.summary,
                                                       created_at: outcome.created_at },
                      metrics })
  }
}

fn metric_summary(id: String, metric: &JudgeMetric) -> MetricSummary {
  MetricSummary { id,
                  name: metric.name.clone(),
                  score: metric.score,
                  passed: metric.passed,
                  details: metric.details.clone() }
}

/// `{score, verdict, summary, details}` donde `details` reúne las métricas,
/// la salida completa del modelo y las claves de su propio `details`.
fn judgement_result(judgement: &OutcomeJudgement) -> Result<JsonValue, WorkflowError> {
  let mut details = Map::new();
  details.insert("metrics".into(), serde_json::to_value(judgement.metrics.clone().unwrap_or_default())?);
  details.insert("raw_llm_output".into(), serde_json::to_value(judgement)?);
  if let Some(JsonValue::Object(extra)) = &judgement.details {
    for (k, v) in extra {
      details.insert(k.clone(), v.clone());
    }
  }
  Ok(json!({
    "score": judgement.score,
    "verdict": judgement.verdict,
    "summary": judgement.summary,
    "details": details,
  }))
}
