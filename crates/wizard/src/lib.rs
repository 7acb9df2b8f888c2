//! Crate `wizard`: sesiones del asistente de preguntas.
//!
//! Define los registros de una sesión (preguntas, respuestas, acciones y
//! snapshots), el contrato de persistencia `WizardRepository`, una
//! implementación en memoria (`InMemoryWizardRepository`) y el navegador
//! `WizardEngine`, que calcula qué preguntas quedan pendientes y aplica los
//! controles de retroceso y omisión.
//!
//! Ejemplo rápido:
//! ```rust
//! use std::sync::Arc;
//! use wizard::{InMemoryWizardRepository, QuestionSession, WizardEngine};
//! let engine = WizardEngine::new(Arc::new(InMemoryWizardRepository::new()));
//! let session = QuestionSession::new(None, "A recipe app", None);
//! engine.open_session(&session).unwrap();
//! assert!(engine.pending_batch(&session.id).unwrap().is_empty());
//! ```
pub mod domain;
pub mod engine;
pub mod errors;
pub mod repository;
pub mod stubs;

pub use domain::*;
pub use engine::*;
pub use errors::*;
pub use repository::*;
pub use stubs::*;
