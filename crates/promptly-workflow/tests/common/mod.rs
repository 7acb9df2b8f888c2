#![allow(dead_code)]

use promptly_domain::{DomainRepository, InMemoryDomainRepository};
use promptly_providers::ScriptedProvider;
use promptly_workflow::{WorkflowConfig, WorkflowContext};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use wizard::InMemoryWizardRepository;

pub struct Harness {
  pub ctx: WorkflowContext,
  pub domain: Arc<InMemoryDomainRepository>,
  pub wizard: Arc<InMemoryWizardRepository>,
  pub provider: Arc<ScriptedProvider>,
  /// Usuarios ya registrados: las specs exigen un propietario existente.
  pub owner: String,
  pub other: String,
}

pub fn harness() -> Harness {
  harness_with(WorkflowConfig::default())
}

pub fn harness_with(config: WorkflowConfig) -> Harness {
  let domain = Arc::new(InMemoryDomainRepository::new());
  let wizard = Arc::new(InMemoryWizardRepository::new());
  let provider = Arc::new(ScriptedProvider::new("gpt-test"));
  let owner = domain.ensure_user("owner@example.com").unwrap().id;
  let other = domain.ensure_user("other@example.com").unwrap().id;
  let ctx = WorkflowContext::new(domain.clone(), wizard.clone(), provider.clone(), config);
  Harness { ctx, domain, wizard, provider, owner, other }
}

pub fn broad_questions() -> JsonValue {
  json!({
    "broad_questions": [
      { "axis": "users", "question": "Who uses it?" },
      { "axis": "platform", "question": "Web or mobile?", "rationale": "deploy target" },
      { "id": "custom", "axis": "data", "question": "What is stored?" }
    ]
  })
}

/// Preguntas del agente B: `n` preguntas alternando tipos.
pub fn choice_questions(n: usize) -> JsonValue {
  let items: Vec<JsonValue> = (0..n).map(|i| {
                                      if i % 2 == 0 {
                                        json!({ "type": "short_text", "content": format!("Question {}", i + 1) })
                                      } else {
                                        json!({
                                          "id": format!("llm_{}", i),
                                          "type": "single_choice",
                                          "content": format!("Question {}", i + 1),
                                          "options": [
                                            { "label": "Yes", "value": "yes" },
                                            { "label": "No", "value": "no" }
                                          ]
                                        })
                                      }
                                    })
                                    .collect();
  json!({ "choice_questions": items })
}

pub fn synthesized_spec() -> JsonValue {
  json!({
    "intent": { "goal": "share recipes" },
    "spec": {
      "title": "Recipe Hub",
      "project_goal": "Let people share recipes",
      "actors": ["cook", "reader"],
      "techStack": { "frontend": "React" },
      "pages": [{ "route": "/", "purpose": "home" }]
    },
    "explanation": "Built from answers"
  })
}
