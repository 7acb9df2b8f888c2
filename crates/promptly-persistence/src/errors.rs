// errors.rs
use promptly_domain::DomainError;
use thiserror::Error;
use wizard::WizardError;

/// Fallos al abrir la base o aplicar migraciones. Los errores de consulta se
/// convierten directamente al error de cada repositorio.
#[derive(Debug, Error)]
pub enum PersistenceError {
  #[error("Configuración de base de datos inválida: {0}")]
  Config(String),
  #[error("No se pudo crear el pool de conexiones: {0}")]
  Pool(String),
  #[error("Fallo al aplicar migraciones: {0}")]
  Migration(String),
}

impl From<PersistenceError> for DomainError {
  fn from(e: PersistenceError) -> Self {
    DomainError::ExternalError(e.to_string())
  }
}

impl From<PersistenceError> for WizardError {
  fn from(e: PersistenceError) -> Self {
    WizardError::Storage(e.to_string())
  }
}
