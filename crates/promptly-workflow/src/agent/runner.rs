use crate::agent::Agent;
use crate::errors::WorkflowError;
use promptly_domain::{DomainRepository, NewRun, Run};
use promptly_providers::ChatProvider;
use std::sync::Arc;

/// Resultado de una llamada registrada: la salida tipada y el run que la
/// documenta.
#[derive(Debug, Clone)]
pub struct LoggedCall<T> {
  pub output: T,
  pub run_id: String,
  pub model: String,
}

/// Ejecuta agentes contra el proveedor. `run_logged` deja constancia de cada
/// llamada en la tabla de runs; `run_unlogged` solo llama y valida.
#[derive(Clone)]
pub struct AgentRunner {
  provider: Arc<dyn ChatProvider>,
  repo: Arc<dyn DomainRepository>,
}

impl AgentRunner {
  pub fn new(provider: Arc<dyn ChatProvider>, repo: Arc<dyn DomainRepository>) -> Self {
    Self { provider, repo }
  }

  pub fn provider(&self) -> &Arc<dyn ChatProvider> {
    &self.provider
  }

  /// Crea un run `pending`, llama al modelo, guarda la salida cruda y la
  /// valida. Un fallo del proveedor o del parser marca el run `failed` con
  /// un único error `runtime_exception` y se propaga.
  pub async fn run_logged<A: Agent>(&self,
                                    agent: &A,
                                    spec_id: Option<&str>,
                                    model: Option<&str>)
                                    -> Result<LoggedCall<A::Output>, WorkflowError> {
    let model = model.filter(|m| !m.is_empty())
                     .unwrap_or_else(|| self.provider.default_model())
                     .to_string();
    let run = Run::pending(NewRun { spec_id: spec_id.map(str::to_string),
                                    spec_version: None,
                                    model: model.clone(),
                                    input_blocks: Some(agent.input_blocks()) })?;
    let run = self.repo.create_run(run)?;

    let result = self.call_and_store(agent, &run.id, &model).await;
    match result {
      Ok(output) => Ok(LoggedCall { output, run_id: run.id, model }),
      Err(err) => {
        log::warn!("agente {} falló en run {}: {}", agent.name(), run.id, err);
        if let Err(log_err) = self.repo
                                  .complete_run_failure(&run.id, "runtime_exception", &err.to_string(), "system")
        {
          log::error!("no se pudo registrar el fallo del run {}: {}", run.id, log_err);
        }
        Err(err)
      }
    }
  }

  async fn call_and_store<A: Agent>(&self, agent: &A, run_id: &str, model: &str) -> Result<A::Output, WorkflowError> {
    let raw = self.provider.chat_json(agent.request(Some(model.to_string()))).await?;
    self.repo.complete_run_success(run_id, raw.clone())?;
    agent.parse(&raw)
  }

  /// Llama al modelo sin registrar un run (enhancer, generador de
  /// candidatos).
  pub async fn run_unlogged<A: Agent>(&self, agent: &A, model: Option<&str>) -> Result<A::Output, WorkflowError> {
    let req = agent.request(model.map(str::to_string));
    let raw = match self.provider.chat_json(req).await {
      Ok(raw) => raw,
      Err(err) => {
        log::warn!("agente {} falló: {}", agent.name(), err);
        return Err(err.into());
      }
    };
    agent.parse(&raw).map_err(|err| {
                       log::warn!("agente {} devolvió una salida inválida: {}", agent.name(), err);
                       err
                     })
  }
}
