// Archivo: engine.rs
// Propósito: implementar `WizardEngine`, el navegador de la sesión de
// preguntas: lotes pendientes, respuestas, retroceso, omisión, sustitución
// de preguntas y snapshots.
//
// Una pregunta está pendiente cuando no tiene respuesta, no se omitió y no
// fue sustituida por una regeneración. Las preguntas sustituidas dejan de ser
// visibles; todos los índices se calculan sobre las visibles.
use crate::domain::{now_ts, Answer, AnswerInput, BatchOutcome, Question, QuestionDraft, QuestionSession, QuestionView,
                    SessionAction, SessionProgress, SessionSnapshot, SessionStatus};
use crate::errors::{Result, WizardError};
use crate::repository::WizardRepository;
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;
use std::sync::Arc;

/// Tamaño de lote de preguntas devuelto al cliente.
pub const BATCH_SIZE: usize = 5;

/// Estado derivado de preguntas, respuestas y acciones de una sesión.
struct SessionState {
    /// Preguntas visibles en orden.
    questions: Vec<Question>,
    answered: HashSet<String>,
    skipped: HashSet<String>,
    replaced: usize,
}

impl SessionState {
    fn is_pending(&self, q: &Question) -> bool {
        !self.answered.contains(&q.id) && !self.skipped.contains(&q.id)
    }

    /// Índice de la primera pendiente, o `len` si no queda ninguna.
    fn current_index(&self) -> usize {
        self.questions
            .iter()
            .position(|q| self.is_pending(q))
            .unwrap_or(self.questions.len())
    }

    fn pending(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| self.is_pending(q))
    }
}

fn views<'a, I>(questions: I) -> Vec<QuestionView>
    where I: IntoIterator<Item = &'a Question>
{
    questions.into_iter().take(BATCH_SIZE).map(Question::view).collect()
}

/// Motor del asistente. Es un envoltorio sin estado propio sobre el
/// repositorio: cada operación recalcula el estado desde la persistencia.
pub struct WizardEngine<R>
    where R: WizardRepository + ?Sized
{
    repo: Arc<R>,
}

impl<R> WizardEngine<R> where R: WizardRepository + ?Sized
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Carga la sesión o devuelve `NotFound("Session not found")`.
    pub fn session(&self, session_id: &str) -> Result<QuestionSession> {
        self.repo
            .get_session(session_id)?
            .ok_or(WizardError::NotFound("Session not found".into()))
    }

    pub fn open_session(&self, session: &QuestionSession) -> Result<()> {
        self.repo.create_session(session)
    }

    /// Persiste las preguntas generadas con ids nuevos, en el orden recibido.
    pub fn add_questions(&self, session_id: &str, drafts: Vec<QuestionDraft>) -> Result<Vec<Question>> {
        let start = self.repo.list_questions(session_id)?.len() as i64;
        let mut inserted = Vec::with_capacity(drafts.len());
        for (i, draft) in drafts.into_iter().enumerate() {
            let q = Question::from_draft(session_id, draft, start + i as i64);
            self.repo.insert_question(&q)?;
            inserted.push(q);
        }
        Ok(inserted)
    }

    fn state(&self, session_id: &str) -> Result<SessionState> {
        let all = self.repo.list_questions(session_id)?;
        let actions = self.repo.list_actions(session_id)?;
        let skipped: HashSet<String> = actions.iter()
                                              .filter_map(|a| a.skipped_question().map(str::to_string))
                                              .collect();
        let replaced_ids: HashSet<String> = actions.iter().filter_map(|a| a.replaced_question()).collect();
        let answered: HashSet<String> = self.repo
                                            .list_answers(session_id)?
                                            .into_iter()
                                            .map(|a| a.question_id)
                                            .collect();
        let total = all.len();
        let questions: Vec<Question> = all.into_iter().filter(|q| !replaced_ids.contains(&q.id)).collect();
        let replaced = total - questions.len();
        Ok(SessionState { questions, answered, skipped, replaced })
    }

    pub fn progress(&self, session_id: &str) -> Result<SessionProgress> {
        let st = self.state(session_id)?;
        let answered = st.questions.iter().filter(|q| st.answered.contains(&q.id)).count();
        let skipped = st.questions
                        .iter()
                        .filter(|q| st.skipped.contains(&q.id) && !st.answered.contains(&q.id))
                        .count();
        Ok(SessionProgress { questions: st.questions.len(),
                             answered,
                             skipped,
                             replaced: st.replaced,
                             current_index: st.current_index() })
    }

    /// Hasta `BATCH_SIZE` preguntas pendientes.
    pub fn pending_batch(&self, session_id: &str) -> Result<Vec<QuestionView>> {
        let st = self.state(session_id)?;
        Ok(views(st.pending()))
    }

    /// Registra respuestas. Se validan todas antes de escribir ninguna.
    pub fn answer(&self, session_id: &str, answers: &[AnswerInput]) -> Result<BatchOutcome> {
        self.session(session_id)?;
        if answers.is_empty() {
            return Err(WizardError::Validation("answers must contain at least one item".into()));
        }
        for a in answers {
            if a.question_id.is_empty() || self.repo.get_question(session_id, &a.question_id)?.is_none() {
                return Err(WizardError::Validation(format!("Unknown question_id: {}", a.question_id)));
            }
        }
        for a in answers {
            self.repo.upsert_answer(&Answer::new(session_id, &a.question_id, a.value.clone()))?;
        }

        let st = self.state(session_id)?;
        let next = views(st.pending());
        if !next.is_empty() {
            return Ok(BatchOutcome { done: false, questions: next, message: None });
        }
        self.repo.set_status(session_id, SessionStatus::ReadyToFinalize)?;
        Ok(BatchOutcome { done: true, questions: Vec::new(), message: None })
    }

    /// Retrocede a la pregunta anterior no omitida y borra su respuesta.
    pub fn go_back(&self, session_id: &str) -> Result<BatchOutcome> {
        let session = self.session(session_id)?;
        let st = self.state(session_id)?;
        let current = st.current_index();
        if current == 0 {
            return Err(WizardError::Validation("Already at the first question".into()));
        }

        let target = (0..current).rev().find(|&i| !st.skipped.contains(&st.questions[i].id));
        let target = match target {
            Some(t) => t,
            None => return Err(WizardError::Validation("No previous question available".into())),
        };

        self.repo.delete_answer(session_id, &st.questions[target].id)?;
        if session.status == SessionStatus::ReadyToFinalize {
            self.repo.set_status(session_id, SessionStatus::Active)?;
        }
        Ok(BatchOutcome { done: false,
                          questions: views(&st.questions[target..]),
                          message: Some(format!("Moved back to question {}", target + 1)) })
    }

    /// Omite una pregunta sin responder y devuelve las siguientes pendientes;
    /// si no queda ninguna detrás, vuelve a las pendientes anteriores.
    pub fn skip(&self, session_id: &str, question_id: &str) -> Result<BatchOutcome> {
        self.session(session_id)?;
        let st = self.state(session_id)?;
        let idx = match st.questions.iter().position(|q| q.id == question_id) {
            Some(i) => i,
            None => return Err(WizardError::Validation("Question not found".into())),
        };
        if st.answered.contains(question_id) {
            return Err(WizardError::Validation("Question already answered".into()));
        }

        self.repo.record_action(&SessionAction::skip(session_id, question_id))?;

        let pending_after: Vec<&Question> = st.questions[idx + 1..].iter().filter(|q| st.is_pending(q)).collect();
        let next = if pending_after.is_empty() {
            views(st.questions[..idx].iter().filter(|q| st.is_pending(q)))
        } else {
            views(pending_after)
        };

        let done = next.is_empty();
        if done {
            self.repo.set_status(session_id, SessionStatus::ReadyToFinalize)?;
        }
        Ok(BatchOutcome { done, questions: next, message: Some("Question skipped".into()) })
    }

    /// Preguntas visibles con su respuesta (o `null`), en orden.
    pub fn qa_pairs(&self, session_id: &str) -> Result<Vec<JsonValue>> {
        let st = self.state(session_id)?;
        let mut by_question: IndexMap<String, JsonValue> = IndexMap::new();
        for a in self.repo.list_answers(session_id)? {
            by_question.insert(a.question_id, a.value);
        }
        Ok(st.questions
             .iter()
             .map(|q| {
                 json!({
                     "id": q.id,
                     "type": q.question_type,
                     "content": q.content,
                     "options": q.options,
                     "answer": by_question.get(&q.id).cloned().unwrap_or(JsonValue::Null),
                 })
             })
             .collect())
    }

    /// Sustituye una pregunta por otra en la misma posición y registra la
    /// acción `regenerate`.
    pub fn replace_question(&self, session_id: &str, old_question_id: &str, draft: QuestionDraft) -> Result<Question> {
        let old = self.repo
                      .get_question(session_id, old_question_id)?
                      .ok_or(WizardError::NotFound("Question not found".into()))?;
        let fresh = Question::from_draft(session_id, draft, old.order_index);
        self.repo.insert_question(&fresh)?;
        self.repo
            .record_action(&SessionAction::regenerate(session_id, old_question_id, &fresh.id))?;
        Ok(fresh)
    }

    /// Guarda el estado completo de la sesión como un snapshot nuevo.
    pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot> {
        let session = self.session(session_id)?;
        let questions = self.repo.list_questions(session_id)?;
        let answers = self.repo.list_answers(session_id)?;
        let actions = self.repo.list_actions(session_id)?;
        let data = json!({
            "session": session,
            "questions": questions,
            "answers": answers,
            "actions": actions,
            "timestamp": now_ts(),
        });
        let snap = SessionSnapshot::new(session_id, data);
        self.repo.save_snapshot(&snap)?;
        Ok(snap)
    }

    pub fn latest_snapshot(&self, session_id: &str) -> Result<SessionSnapshot> {
        self.session(session_id)?;
        self.repo
            .load_latest_snapshot(session_id)?
            .ok_or(WizardError::NotFound("No snapshot available".into()))
    }
}
