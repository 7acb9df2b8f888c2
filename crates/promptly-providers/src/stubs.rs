// stubs.rs
//
// Proveedores sin red: uno que rechaza todo (sin clave de API) y otro que
// devuelve respuestas preparadas, para pruebas.
use crate::provider::{ChatProvider, ChatRequest};
use crate::ProviderError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct DisabledProvider {
  model: String,
}

impl DisabledProvider {
  pub fn new(model: &str) -> Self {
    Self { model: model.to_string() }
  }
}

#[async_trait]
impl ChatProvider for DisabledProvider {
  fn default_model(&self) -> &str {
    &self.model
  }

  fn is_enabled(&self) -> bool {
    false
  }

  async fn chat_json(&self, _request: ChatRequest) -> Result<JsonValue, ProviderError> {
    Err(ProviderError::Disabled)
  }
}

/// Devuelve las respuestas encoladas en orden y guarda cada petición. Con la
/// cola vacía responde `InvalidResponse`.
pub struct ScriptedProvider {
  model: String,
  responses: Mutex<VecDeque<Result<JsonValue, ProviderError>>>,
  requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
  pub fn new(model: &str) -> Self {
    Self { model: model.to_string(),
           responses: Mutex::new(VecDeque::new()),
           requests: Mutex::new(Vec::new()) }
  }

  /// Encola una respuesta correcta.
  pub fn push(&self, value: JsonValue) -> &Self {
    self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(Ok(value));
    self
  }

  /// Encola un fallo.
  pub fn push_error(&self, error: ProviderError) -> &Self {
    self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(Err(error));
    self
  }

  pub fn requests(&self) -> Vec<ChatRequest> {
    self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  pub fn remaining(&self) -> usize {
    self.responses.lock().unwrap_or_else(|e| e.into_inner()).len()
  }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
  fn default_model(&self) -> &str {
    &self.model
  }

  fn is_enabled(&self) -> bool {
    true
  }

  async fn chat_json(&self, request: ChatRequest) -> Result<JsonValue, ProviderError> {
    self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);
    self.responses
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop_front()
        .unwrap_or_else(|| Err(ProviderError::InvalidResponse("no scripted response left".into())))
  }
}
