use crate::config::Settings;
use promptly_domain::DomainRepository;
use promptly_providers::ChatProvider;
use promptly_workflow::{EnhancerService, OutcomeService, RunService, SpecService, WizardService, WorkflowContext};
use std::sync::Arc;
use wizard::WizardRepository;

/// Estado compartido por los handlers. Clonarlo solo copia `Arc`s.
#[derive(Clone)]
pub struct AppState {
  pub settings: Arc<Settings>,
  pub domain: Arc<dyn DomainRepository>,
  pub provider: Arc<dyn ChatProvider>,
  pub wizard: WizardService,
  pub specs: SpecService,
  pub runs: RunService,
  pub enhancer: EnhancerService,
  pub outcome: OutcomeService,
}

impl AppState {
  pub fn new(settings: Settings,
             domain: Arc<dyn DomainRepository>,
             wizard_repo: Arc<dyn WizardRepository>,
             provider: Arc<dyn ChatProvider>)
             -> Self {
    let ctx = WorkflowContext::new(domain.clone(), wizard_repo, provider.clone(), settings.workflow.clone());
    Self { settings: Arc::new(settings),
           domain,
           provider,
           wizard: WizardService::new(ctx.clone()),
           specs: SpecService::new(ctx.clone()),
           runs: RunService::new(ctx.clone()),
           enhancer: EnhancerService::new(ctx.clone()),
           outcome: OutcomeService::new(ctx) }
  }

  pub fn llm_enabled(&self) -> bool {
    self.provider.is_enabled()
  }
}
