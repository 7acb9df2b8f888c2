use promptly_providers::ProviderError;
use thiserror::Error;

// Errores comunes de los servicios de workflow.
//
// Este enum agrupa los errores de las capas inferiores (dominio, asistente,
// proveedor LLM) y los propios del orquestador: validación de peticiones,
// salidas del modelo que no cumplen el esquema esperado y recursos
// inexistentes.
#[derive(Error, Debug)]
pub enum WorkflowError {
  /// Errores del repositorio o de las reglas del dominio.
  #[error("Error de dominio: {0}")]
  Domain(#[from] promptly_domain::DomainError),

  /// Errores del asistente de preguntas.
  #[error("Error del asistente: {0}")]
  Wizard(#[from] wizard::WizardError),

  /// Errores de la llamada al modelo (deshabilitado, HTTP, respuesta).
  #[error("Error del proveedor: {0}")]
  Provider(#[from] ProviderError),

  /// Errores de serializacion/deserializacion JSON.
  #[error("Error de serializacion: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Petición inválida. El mensaje se devuelve al cliente.
  #[error("Error de validacion: {0}")]
  Validation(String),

  /// La salida del modelo no cumple el esquema del agente.
  #[error("Salida inválida de {agent}: {message}")]
  InvalidOutput { agent: String, message: String },

  #[error("No encontrado: {0}")]
  NotFound(String),

  #[error("Conflicto: {0}")]
  Conflict(String),
}

impl WorkflowError {
  pub fn invalid_output(agent: &str, message: impl Into<String>) -> Self {
    Self::InvalidOutput { agent: agent.to_string(), message: message.into() }
  }

  /// `true` cuando el fallo se debe a que no hay clave de API configurada.
  pub fn is_llm_disabled(&self) -> bool {
    matches!(self, Self::Provider(ProviderError::Disabled))
  }

  /// `true` para fallos del modelo: HTTP, respuesta no JSON o esquema roto.
  pub fn is_upstream(&self) -> bool {
    matches!(self, Self::Provider(_) | Self::InvalidOutput { .. })
  }
}
