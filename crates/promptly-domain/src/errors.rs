// errors.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("No encontrado: {0}")]
  NotFound(String),
  #[error("Conflicto: {0}")]
  Conflict(String),
  #[error("Error externo: {0}")]
  ExternalError(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl DomainError {
  /// Mensaje sin el prefijo del `Display`, útil para respuestas HTTP.
  pub fn message(&self) -> &str {
    match self {
      Self::ValidationError(m)
      | Self::NotFound(m)
      | Self::Conflict(m)
      | Self::ExternalError(m)
      | Self::SerializationError(m) => m,
    }
  }
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}
