// Archivo: errors.rs
// Propósito: errores del asistente de preguntas y el alias Result<T> usado
// por las APIs del crate.
use thiserror::Error;
/// Errores comunes del asistente.
///
/// - `NotFound`: sesión, pregunta o snapshot inexistente.
/// - `Validation`: petición incoherente con el estado de la sesión.
/// - `Storage`: error al acceder al almacenamiento.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    /// El mensaje se devuelve tal cual al cliente.
    #[error("Validación: {0}")]
    Validation(String),
    #[error("Conflicto: {0}")]
    Conflict(String),
    #[error("Error de almacenamiento: {0}")]
    Storage(String),
}

impl WizardError {
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::Validation(m) | Self::Conflict(m) | Self::Storage(m) => m,
        }
    }
}

impl From<serde_json::Error> for WizardError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(format!("JSON inválido: {}", e))
    }
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, WizardError>;
