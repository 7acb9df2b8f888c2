use crate::errors::WorkflowError;
use promptly_providers::ChatRequest;
use serde_json::{json, Value as JsonValue};

/// Une las frases de un prompt de sistema con espacios simples.
pub fn join_prompt(lines: &[&str]) -> String {
  lines.join(" ")
}

/// Trait que representa un agente LLM: un prompt de sistema, un payload de
/// usuario serializado como JSON y un parser tipado de la respuesta.
pub trait Agent: Send + Sync {
  /// Salida tipada que produce `parse`.
  type Output: Send;

  /// Nombre o identificador del agente (se usa en logs y errores).
  fn name(&self) -> &str;

  fn system_prompt(&self) -> String;

  /// Cuerpo del mensaje de usuario. Se envía como texto JSON.
  fn user_payload(&self) -> JsonValue;

  /// Lo que se guarda como `input_blocks` del run registrado.
  fn input_blocks(&self) -> JsonValue {
    json!({ "agent": self.name() })
  }

  fn temperature(&self) -> Option<f64> {
    None
  }

  fn max_tokens(&self) -> Option<u32> {
    None
  }

  /// Valida la respuesta del modelo. Debe devolver
  /// `WorkflowError::InvalidOutput` cuando no cumple el esquema.
  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError>;

  /// Construye la petición para el proveedor.
  fn request(&self, model: Option<String>) -> ChatRequest {
    let mut req = ChatRequest::new(self.system_prompt(), self.user_payload().to_string()).with_model(model);
    req.temperature = self.temperature();
    req.max_tokens = self.max_tokens();
    req
  }
}
