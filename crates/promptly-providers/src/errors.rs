// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
  /// No hay clave de API configurada.
  #[error("LLM features are disabled")]
  Disabled,
  #[error("Error HTTP del proveedor ({status:?}): {message}")]
  Http { message: String, status: Option<u16> },
  #[error("Respuesta inválida del proveedor: {0}")]
  InvalidResponse(String),
  #[error("Error de serialización: {0}")]
  Serialization(String),
}

impl From<serde_json::Error> for ProviderError {
  fn from(e: serde_json::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}
