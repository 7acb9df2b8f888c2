//! Persistencia SQLite (Diesel + r2d2) para los repositorios del dominio y
//! del asistente de preguntas. Ambos repositorios comparten un mismo
//! `Database`, que aplica las migraciones embebidas al abrirse.

mod connection;
mod domain_persistence;
mod errors;
pub mod schema;
mod wizard_persistence;

pub use connection::{Database, DbConn, DbPool, DEFAULT_SQLITE_PATH, MIGRATIONS};
pub use domain_persistence::DieselDomainRepository;
pub use errors::PersistenceError;
pub use wizard_persistence::DieselWizardRepository;

/// Abre la base indicada por el entorno y construye ambos repositorios.
pub fn new_from_env() -> Result<(DieselDomainRepository, DieselWizardRepository), PersistenceError> {
  let db = Database::open_from_env()?;
  Ok((DieselDomainRepository::new(db.clone()), DieselWizardRepository::new(db)))
}
