use promptly_providers::DEFAULT_MODEL;
use std::env;

/// Máximo de candidatos por petición del generador de resultados.
pub const DEFAULT_MAX_CANDIDATES: u32 = 8;

/// Parámetros de los servicios que no dependen del proveedor.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
  /// Modelo por defecto de los agentes registrados.
  pub default_model: String,
  /// Modelo del juez y del generador de resultados (`OUTCOME_MODEL`).
  pub outcome_model: Option<String>,
  pub max_candidates: u32,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self { default_model: DEFAULT_MODEL.to_string(),
           outcome_model: None,
           max_candidates: DEFAULT_MAX_CANDIDATES }
  }
}

impl WorkflowConfig {
  /// Lee `OPENAI_MODEL`, `OUTCOME_MODEL` y `MAX_CANDIDATES`. Los valores
  /// vacíos o inválidos se ignoran.
  pub fn from_env() -> Self {
    dotenvy::dotenv().ok();
    let mut cfg = Self::default();
    if let Some(model) = non_empty_var("OPENAI_MODEL") {
      cfg.default_model = model;
    }
    cfg.outcome_model = non_empty_var("OUTCOME_MODEL");
    if let Some(n) = non_empty_var("MAX_CANDIDATES").and_then(|v| v.parse::<u32>().ok()) {
      if n > 0 {
        cfg.max_candidates = n;
      }
    }
    cfg
  }

  /// Modelo para el juez y el generador: override, `OUTCOME_MODEL` o el
  /// modelo por defecto.
  pub fn outcome_model_for(&self, model_override: Option<&str>) -> String {
    model_override.filter(|m| !m.trim().is_empty())
                  .map(str::to_string)
                  .or_else(|| self.outcome_model.clone())
                  .unwrap_or_else(|| self.default_model.clone())
  }

  pub fn model_for(&self, model_override: Option<&str>) -> String {
    model_override.filter(|m| !m.trim().is_empty())
                  .map(str::to_string)
                  .unwrap_or_else(|| self.default_model.clone())
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
