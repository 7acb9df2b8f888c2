// config.rs
//
// Configuración del proveedor leída del entorno (con `.env` si existe).
use crate::openai::OpenAiProvider;
use crate::provider::{ChatProvider, DEFAULT_MODEL};
use crate::stubs::DisabledProvider;
use crate::ProviderError;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
  pub api_key: Option<String>,
  pub model: String,
  pub base_url: String,
  pub timeout_secs: u64,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self { api_key: None,
           model: DEFAULT_MODEL.to_string(),
           base_url: DEFAULT_BASE_URL.to_string(),
           timeout_secs: DEFAULT_TIMEOUT_SECS }
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProviderConfig {
  /// Lee `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL` y
  /// `LLM_TIMEOUT_SECS`.
  pub fn from_env() -> Self {
    dotenvy::dotenv().ok();
    let defaults = Self::default();
    Self { api_key: non_empty_var("OPENAI_API_KEY"),
           model: non_empty_var("OPENAI_MODEL").unwrap_or(defaults.model),
           base_url: non_empty_var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
           timeout_secs: non_empty_var("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok())
                                                          .unwrap_or(defaults.timeout_secs) }
  }

  /// Construye el proveedor: HTTP si hay clave, deshabilitado si no.
  pub fn build(&self) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    match &self.api_key {
      Some(key) => Ok(Arc::new(OpenAiProvider::new(key.clone(), self)?)),
      None => {
        log::warn!("OPENAI_API_KEY no está definido; las funciones LLM quedan deshabilitadas");
        Ok(Arc::new(DisabledProvider::new(&self.model)))
      }
    }
  }
}

/// Atajo: configuración del entorno + `build`.
pub fn new_from_env() -> Result<Arc<dyn ChatProvider>, ProviderError> {
  ProviderConfig::from_env().build()
}
