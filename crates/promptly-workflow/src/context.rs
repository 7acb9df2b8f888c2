use crate::agent::AgentRunner;
use crate::config::WorkflowConfig;
use promptly_domain::DomainRepository;
use promptly_providers::ChatProvider;
use std::sync::Arc;
use wizard::{WizardEngine, WizardRepository};

/// Contexto compartido por los servicios: repositorios, motor del asistente
/// y proveedor LLM.
///
/// Se construye una vez al arrancar y se clona barato (todo es `Arc`).
#[derive(Clone)]
pub struct WorkflowContext {
  /// Repositorio del dominio (specs, runs, evaluaciones, resultados...).
  pub domain_repo: Arc<dyn DomainRepository>,
  /// Navegador de sesiones de preguntas sobre su repositorio.
  pub wizard: Arc<WizardEngine<dyn WizardRepository>>,
  pub provider: Arc<dyn ChatProvider>,
  pub config: WorkflowConfig,
}

impl WorkflowContext {
  pub fn new(domain_repo: Arc<dyn DomainRepository>,
             wizard_repo: Arc<dyn WizardRepository>,
             provider: Arc<dyn ChatProvider>,
             config: WorkflowConfig)
             -> Self {
    Self { domain_repo, wizard: Arc::new(WizardEngine::new(wizard_repo)), provider, config }
  }

  /// Runner de agentes que registra sus runs en `domain_repo`.
  pub fn runner(&self) -> AgentRunner {
    AgentRunner::new(self.provider.clone(), self.domain_repo.clone())
  }

  pub fn llm_enabled(&self) -> bool {
    self.provider.is_enabled()
  }
}
