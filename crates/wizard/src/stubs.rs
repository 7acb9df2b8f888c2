// Archivo: stubs.rs
// Propósito: repositorio en memoria para pruebas y wiring rápido. No es
// durable.
use crate::domain::{now_ts, Answer, Question, QuestionSession, SessionAction, SessionSnapshot, SessionStatus};
use crate::errors::{Result, WizardError};
use crate::repository::WizardRepository;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub struct InMemoryWizardRepository {
    /// Sesiones indexadas por id.
    sessions: Mutex<HashMap<String, QuestionSession>>,
    questions: Mutex<Vec<Question>>,
    answers: Mutex<Vec<Answer>>,
    actions: Mutex<Vec<SessionAction>>,
    snapshots: Mutex<Vec<SessionSnapshot>>,
}

impl InMemoryWizardRepository {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()),
               questions: Mutex::new(Vec::new()),
               answers: Mutex::new(Vec::new()),
               actions: Mutex::new(Vec::new()),
               snapshots: Mutex::new(Vec::new()) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `WizardError::Storage`.
    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, WizardError> {
        m.lock().map_err(|e| WizardError::Storage(format!("mutex poisoned: {:?}", e)))
    }

    fn ensure_session(&self, session_id: &str) -> Result<()> {
        if self.lock(&self.sessions)?.contains_key(session_id) {
            Ok(())
        } else {
            Err(WizardError::Storage(format!("FOREIGN KEY constraint failed: session {}", session_id)))
        }
    }

    fn update_session<F>(&self, session_id: &str, f: F) -> Result<()>
        where F: FnOnce(&mut QuestionSession)
    {
        let mut sessions = self.lock(&self.sessions)?;
        let session = sessions.get_mut(session_id)
                              .ok_or(WizardError::NotFound("Session not found".into()))?;
        f(session);
        session.updated_at = now_ts();
        Ok(())
    }
}

impl Default for InMemoryWizardRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardRepository for InMemoryWizardRepository {
    fn create_session(&self, session: &QuestionSession) -> Result<()> {
        self.lock(&self.sessions)?.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn get_session(&self, session_id: &str) -> Result<Option<QuestionSession>> {
        Ok(self.lock(&self.sessions)?.get(session_id).cloned())
    }

    fn set_status(&self, session_id: &str, status: SessionStatus) -> Result<()> {
        self.update_session(session_id, |s| s.status = status)
    }

    fn complete_session(&self,
                        session_id: &str,
                        intent: Option<JsonValue>,
                        spec: JsonValue,
                        compiled_prompt: JsonValue,
                        explanation: Option<String>)
                        -> Result<()> {
        self.update_session(session_id, |s| {
                s.status = SessionStatus::Completed;
                s.intent = intent;
                s.spec = Some(spec);
                s.compiled_prompt = Some(compiled_prompt);
                s.explanation = explanation;
            })
    }

    fn insert_question(&self, question: &Question) -> Result<()> {
        self.ensure_session(&question.session_id)?;
        self.lock(&self.questions)?.push(question.clone());
        Ok(())
    }

    fn get_question(&self, session_id: &str, question_id: &str) -> Result<Option<Question>> {
        let questions = self.lock(&self.questions)?;
        Ok(questions.iter()
                    .find(|q| q.session_id == session_id && q.id == question_id)
                    .cloned())
    }

    fn list_questions(&self, session_id: &str) -> Result<Vec<Question>> {
        let questions = self.lock(&self.questions)?;
        let mut items: Vec<Question> = questions.iter().filter(|q| q.session_id == session_id).cloned().collect();
        // sort_by_key es estable: a igual posición queda el orden de inserción
        items.sort_by_key(|q| q.order_index);
        Ok(items)
    }

    fn upsert_answer(&self, answer: &Answer) -> Result<()> {
        if self.get_question(&answer.session_id, &answer.question_id)?.is_none() {
            return Err(WizardError::Storage(format!("FOREIGN KEY constraint failed: question {}", answer.question_id)));
        }
        let mut answers = self.lock(&self.answers)?;
        answers.retain(|a| !(a.session_id == answer.session_id && a.question_id == answer.question_id));
        answers.push(answer.clone());
        Ok(())
    }

    fn delete_answer(&self, session_id: &str, question_id: &str) -> Result<()> {
        let mut answers = self.lock(&self.answers)?;
        answers.retain(|a| !(a.session_id == session_id && a.question_id == question_id));
        Ok(())
    }

    fn list_answers(&self, session_id: &str) -> Result<Vec<Answer>> {
        let answers = self.lock(&self.answers)?;
        Ok(answers.iter().filter(|a| a.session_id == session_id).cloned().collect())
    }

    fn record_action(&self, action: &SessionAction) -> Result<()> {
        self.ensure_session(&action.session_id)?;
        self.lock(&self.actions)?.push(action.clone());
        Ok(())
    }

    fn list_actions(&self, session_id: &str) -> Result<Vec<SessionAction>> {
        let actions = self.lock(&self.actions)?;
        Ok(actions.iter().filter(|a| a.session_id == session_id).cloned().collect())
    }

    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.ensure_session(&snapshot.session_id)?;
        self.lock(&self.snapshots)?.push(snapshot.clone());
        Ok(())
    }

    fn load_latest_snapshot(&self, session_id: &str) -> Result<Option<SessionSnapshot>> {
        let snapshots = self.lock(&self.snapshots)?;
        Ok(snapshots.iter().rev().find(|s| s.session_id == session_id).cloned())
    }
}
