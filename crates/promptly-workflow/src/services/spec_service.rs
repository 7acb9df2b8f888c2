use crate::agents::EvaluatorAgent;
use crate::context::WorkflowContext;
use crate::errors::WorkflowError;
use promptly_domain::{compile_spec_to_prompt, CompiledPrompt, CompiledPromptRecord, Evaluation, Spec, SpecFilter,
                      SpecInput};

/// Prompt compilado y persistido en la misma operación.
#[derive(Debug, Clone)]
pub struct CompiledSpec {
  pub record: CompiledPromptRecord,
  pub compiled: CompiledPrompt,
}

/// CRUD de specs, compilación a prompt y evaluación con el agente
/// evaluador.
#[derive(Clone)]
pub struct SpecService {
  ctx: WorkflowContext,
}

impl SpecService {
  pub fn new(ctx: WorkflowContext) -> Self {
    Self { ctx }
  }

  pub fn create(&self, owner_id: &str, input: SpecInput) -> Result<Spec, WorkflowError> {
    let spec = self.ctx.domain_repo.create_spec(Spec::create(owner_id, input)?)?;
    log::info!("spec {} creada por {}", spec.id, owner_id);
    Ok(spec)
  }

  pub fn list(&self, filter: &SpecFilter) -> Result<(Vec<Spec>, i64), WorkflowError> {
    Ok(self.ctx.domain_repo.list_specs(filter)?)
  }

  /// Spec visible para `user_id`. Las ajenas se tratan como inexistentes.
  pub fn get_owned(&self, spec_id: &str, user_id: &str) -> Result<Spec, WorkflowError> {
    match self.ctx.domain_repo.get_spec(spec_id)? {
      Some(spec) if spec.is_owned_by(user_id) => Ok(spec),
      _ => Err(WorkflowError::NotFound("Not found".into())),
    }
  }

  /// Sustituye la spec y devuelve la nueva versión.
  pub fn update(&self, spec_id: &str, user_id: &str, input: SpecInput) -> Result<i64, WorkflowError> {
    let current = self.get_owned(spec_id, user_id)?;
    let next = current.apply_patch(input)?;
    self.ctx.domain_repo.update_spec(&next)?;
    Ok(next.version)
  }

  fn compile_spec(&self, spec: &Spec) -> Result<CompiledSpec, WorkflowError> {
    let compiled = compile_spec_to_prompt(&spec.spec);
    let record = self.ctx
                     .domain_repo
                     .save_compiled_prompt(CompiledPromptRecord::from_compiled(&spec.id, &compiled))?;
    Ok(CompiledSpec { record, compiled })
  }

  pub fn compile(&self, spec_id: &str, user_id: &str) -> Result<CompiledSpec, WorkflowError> {
    let spec = self.get_owned(spec_id, user_id)?;
    self.compile_spec(&spec)
  }

  /// Evalúa el último prompt compilado de la spec; si no hay ninguno lo
  /// compila y lo guarda antes.
  pub async fn evaluate(&self, spec_id: &str, user_id: &str, model: Option<&str>) -> Result<Evaluation, WorkflowError> {
    let spec = self.get_owned(spec_id, user_id)?;
    let record = match self.ctx.domain_repo.latest_compiled_prompt(&spec.id)? {
      Some(record) => record,
      None => self.compile_spec(&spec)?.record,
    };
    self.run_evaluation(&spec, &record, model).await
  }

  /// Compila siempre un prompt nuevo y lo evalúa.
  pub async fn compile_and_evaluate(&self,
                                    spec_id: &str,
                                    user_id: &str,
                                    model: Option<&str>)
                                    -> Result<(CompiledSpec, Evaluation), WorkflowError> {
    let spec = self.get_owned(spec_id, user_id)?;
    let compiled = self.compile_spec(&spec)?;
    let evaluation = self.run_evaluation(&spec, &compiled.record, model).await?;
    Ok((compiled, evaluation))
  }

  async fn run_evaluation(&self,
                          spec: &Spec,
                          record: &CompiledPromptRecord,
                          model: Option<&str>)
                          -> Result<Evaluation, WorkflowError> {
    let model = self.ctx.config.model_for(model);
    let agent = EvaluatorAgent { spec: spec.spec.clone(), blocks: record.blocks.clone() };
    let call = self.ctx.runner().run_logged(&agent, None, Some(&model)).await?;
    let evaluation = Evaluation::new(&spec.id, &record.id, Some(call.run_id), &call.model, call.output);
    let saved = self.ctx.domain_repo.save_evaluation(evaluation)?;
    log::info!("evaluación {} de la spec {}: {} ({})", saved.id, spec.id, saved.score, saved.verdict);
    Ok(saved)
  }

  pub fn evaluations(&self, spec_id: &str, user_id: &str) -> Result<Vec<Evaluation>, WorkflowError> {
    let spec = self.get_owned(spec_id, user_id)?;
    Ok(self.ctx.domain_repo.list_evaluations(&spec.id)?)
  }
}
