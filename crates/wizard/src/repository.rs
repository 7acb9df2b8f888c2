// Archivo: repository.rs
// Propósito: definir el trait `WizardRepository`, el contrato que deben
// implementar las persistencias (SQLite, in-memory) de las sesiones de
// preguntas.
use crate::domain::{Answer, Question, QuestionSession, SessionAction, SessionSnapshot, SessionStatus};
use crate::errors::Result;
use serde_json::Value as JsonValue;

/// Contrato del repositorio de sesiones de preguntas.
pub trait WizardRepository: Send + Sync {
    fn create_session(&self, session: &QuestionSession) -> Result<()>;

    fn get_session(&self, session_id: &str) -> Result<Option<QuestionSession>>;

    /// Cambia el estado y actualiza `updated_at`.
    fn set_status(&self, session_id: &str, status: SessionStatus) -> Result<()>;

    /// Guarda el resultado de la síntesis y marca la sesión `completed`.
    fn complete_session(&self,
                        session_id: &str,
                        intent: Option<JsonValue>,
                        spec: JsonValue,
                        compiled_prompt: JsonValue,
                        explanation: Option<String>)
                        -> Result<()>;

    fn insert_question(&self, question: &Question) -> Result<()>;

    /// Busca la pregunta dentro de la sesión indicada.
    fn get_question(&self, session_id: &str, question_id: &str) -> Result<Option<Question>>;

    /// Preguntas de la sesión ordenadas por `order_index`.
    fn list_questions(&self, session_id: &str) -> Result<Vec<Question>>;

    /// Sustituye cualquier respuesta previa a la misma pregunta.
    fn upsert_answer(&self, answer: &Answer) -> Result<()>;

    fn delete_answer(&self, session_id: &str, question_id: &str) -> Result<()>;

    /// Respuestas en orden de creación.
    fn list_answers(&self, session_id: &str) -> Result<Vec<Answer>>;

    fn record_action(&self, action: &SessionAction) -> Result<()>;

    fn list_actions(&self, session_id: &str) -> Result<Vec<SessionAction>>;

    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Último snapshot guardado para la sesión, si existe.
    fn load_latest_snapshot(&self, session_id: &str) -> Result<Option<SessionSnapshot>>;
}
