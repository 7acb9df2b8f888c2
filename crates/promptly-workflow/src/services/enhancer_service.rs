use crate::agents::{EnhanceMode, EnhancerAgent, EnhancerOutput};
use crate::context::WorkflowContext;
use crate::errors::WorkflowError;

/// Mejora, valida o puntúa un prompt libre. Las llamadas no se registran
/// como runs.
#[derive(Clone)]
pub struct EnhancerService {
  ctx: WorkflowContext,
}

impl EnhancerService {
  pub fn new(ctx: WorkflowContext) -> Self {
    Self { ctx }
  }

  pub async fn enhance(&self, mode: EnhanceMode, prompt: &str) -> Result<EnhancerOutput, WorkflowError> {
    if prompt.is_empty() {
      return Err(WorkflowError::Validation("prompt is required".into()));
    }
    self.ctx.runner().run_unlogged(&EnhancerAgent::new(mode, prompt), None).await
  }
}
