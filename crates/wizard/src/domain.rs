// Archivo: domain.rs
// Propósito: tipos del asistente de preguntas: sesiones, preguntas,
// respuestas, acciones (skip/regenerate) y snapshots.
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::errors::WizardError;

// Ids y marcas de tiempo con el mismo formato que el resto de entidades.
pub use promptly_domain::ids::{new_id, now_ts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    ReadyToFinalize,
    Completed,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::ReadyToFinalize => "ready_to_finalize",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "ready_to_finalize" => Ok(SessionStatus::ReadyToFinalize),
            "completed" => Ok(SessionStatus::Completed),
            "error" => Ok(SessionStatus::Error),
            other => Err(WizardError::Storage(format!("estado de sesión desconocido: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSession {
    pub id: String,
    pub owner_id: Option<String>,
    pub initial_description: String,
    pub kind: Option<String>,
    pub status: SessionStatus,
    pub intent: Option<JsonValue>,
    pub spec: Option<JsonValue>,
    pub compiled_prompt: Option<JsonValue>,
    pub explanation: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl QuestionSession {
    /// Nueva sesión en estado `active`.
    pub fn new(owner_id: Option<String>, initial_description: &str, kind: Option<String>) -> Self {
        let now = now_ts();
        Self { id: new_id("sess_", 16),
               owner_id,
               initial_description: initial_description.to_string(),
               kind: kind.filter(|k| !k.is_empty()),
               status: SessionStatus::Active,
               intent: None,
               spec: None,
               compiled_prompt: None,
               explanation: None,
               created_at: now.clone(),
               updated_at: now }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    YesNo,
    ShortText,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiChoice => "multi_choice",
            QuestionType::YesNo => "yes_no",
            QuestionType::ShortText => "short_text",
        }
    }
}

impl FromStr for QuestionType {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_choice" => Ok(QuestionType::SingleChoice),
            "multi_choice" => Ok(QuestionType::MultiChoice),
            "yes_no" => Ok(QuestionType::YesNo),
            "short_text" => Ok(QuestionType::ShortText),
            other => Err(WizardError::Storage(format!("tipo de pregunta desconocido: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_other: Option<bool>,
}

/// Pregunta propuesta por el generador, todavía sin id ni posición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub content: String,
    #[serde(default)]
    pub options: Option<Vec<QuestionOption>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub content: String,
    pub options: Option<Vec<QuestionOption>>,
    pub order_index: i64,
}

impl Question {
    pub fn from_draft(session_id: &str, draft: QuestionDraft, order_index: i64) -> Self {
        Self { id: new_id("q_", 12),
               session_id: session_id.to_string(),
               question_type: draft.question_type,
               content: draft.content,
               options: draft.options,
               order_index }
    }

    pub fn view(&self) -> QuestionView {
        QuestionView { id: self.id.clone(),
                       question_type: self.question_type,
                       content: self.content.clone(),
                       options: self.options.clone() }
    }
}

/// Forma pública de una pregunta: `{id, type, content, options}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub content: String,
    pub options: Option<Vec<QuestionOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    pub session_id: String,
    pub question_id: String,
    pub value: JsonValue,
    pub created_at: String,
}

impl Answer {
    pub fn new(session_id: &str, question_id: &str, value: JsonValue) -> Self {
        Self { id: new_id("ans_", 16),
               session_id: session_id.to_string(),
               question_id: question_id.to_string(),
               value,
               created_at: now_ts() }
    }
}

/// Respuesta tal como llega en la petición.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: String,
    #[serde(default)]
    pub value: JsonValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Skip,
    Regenerate,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Skip => "skip",
            ActionKind::Regenerate => "regenerate",
        }
    }
}

impl FromStr for ActionKind {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(ActionKind::Skip),
            "regenerate" => Ok(ActionKind::Regenerate),
            other => Err(WizardError::Storage(format!("acción desconocida: {}", other))),
        }
    }
}

/// Acción registrada sobre la sesión. En un `skip` el payload es el id de la
/// pregunta; en un `regenerate` es el JSON
/// `{"old_question_id": .., "new_question_id": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAction {
    pub id: String,
    pub session_id: String,
    pub action: ActionKind,
    pub payload: Option<String>,
    pub created_at: String,
}

impl SessionAction {
    pub fn skip(session_id: &str, question_id: &str) -> Self {
        Self { id: new_id("act_", 12),
               session_id: session_id.to_string(),
               action: ActionKind::Skip,
               payload: Some(question_id.to_string()),
               created_at: now_ts() }
    }

    pub fn regenerate(session_id: &str, old_question_id: &str, new_question_id: &str) -> Self {
        let payload = serde_json::json!({ "old_question_id": old_question_id, "new_question_id": new_question_id });
        Self { id: new_id("act_", 12),
               session_id: session_id.to_string(),
               action: ActionKind::Regenerate,
               payload: Some(payload.to_string()),
               created_at: now_ts() }
    }

    /// Id de la pregunta omitida, si es un `skip`.
    pub fn skipped_question(&self) -> Option<&str> {
        match self.action {
            ActionKind::Skip => self.payload.as_deref(),
            ActionKind::Regenerate => None,
        }
    }

    /// Id de la pregunta sustituida, si es un `regenerate` con payload válido.
    pub fn replaced_question(&self) -> Option<String> {
        if self.action != ActionKind::Regenerate {
            return None;
        }
        let payload: JsonValue = serde_json::from_str(self.payload.as_deref()?).ok()?;
        payload.get("old_question_id").and_then(|v| v.as_str()).map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub session_id: String,
    pub snapshot: JsonValue,
    pub created_at: String,
}

impl SessionSnapshot {
    pub fn new(session_id: &str, snapshot: JsonValue) -> Self {
        Self { id: new_id("snap_", 12),
               session_id: session_id.to_string(),
               snapshot,
               created_at: now_ts() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub questions: usize,
    pub answered: usize,
    pub skipped: usize,
    pub replaced: usize,
    pub current_index: usize,
}

/// Resultado de responder, retroceder u omitir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub done: bool,
    pub questions: Vec<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
