// provider.rs
use crate::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Modelo usado cuando no se configura ninguno.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Petición de chat con salida JSON: un mensaje de sistema y uno de usuario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatRequest {
  pub system: String,
  pub user: String,
  /// `None` usa el modelo por defecto del proveedor.
  pub model: Option<String>,
  pub temperature: Option<f64>,
  pub max_tokens: Option<u32>,
}

impl ChatRequest {
  pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
    Self { system: system.into(), user: user.into(), ..Default::default() }
  }

  pub fn with_model(mut self, model: Option<String>) -> Self {
    self.model = model.filter(|m| !m.is_empty());
    self
  }
}

/// Proveedor de chat que devuelve siempre un documento JSON.
#[async_trait]
pub trait ChatProvider: Send + Sync {
  fn default_model(&self) -> &str;

  /// `false` cuando el proveedor rechaza todas las llamadas.
  fn is_enabled(&self) -> bool;

  async fn chat_json(&self, request: ChatRequest) -> Result<JsonValue, ProviderError>;
}
