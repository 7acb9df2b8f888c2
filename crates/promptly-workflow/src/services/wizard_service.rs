use crate::agents::{BroadQuestionsAgent, ChoiceQuestionsAgent, SpecSynthesisAgent};
use crate::context::WorkflowContext;
use crate::errors::WorkflowError;
use promptly_domain::{compile_spec_to_prompt, CompiledPrompt, CompiledPromptRecord, Spec, DEMO_USER_ID};
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::Value as JsonValue;
use wizard::{AnswerInput, BatchOutcome, QuestionDraft, QuestionSession, QuestionView, SessionProgress,
             SessionSnapshot, SessionStatus};

/// Longitud máxima de `kind` en una sesión nueva.
pub const MAX_KIND_LEN: usize = 64;

/// Control opcional enviado junto con las respuestas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerControl {
  Back,
  Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedSession {
  pub session_id: String,
  pub questions: Vec<QuestionView>,
}

/// Resultado de enviar respuestas: otro lote, o la sesión lista para
/// finalizar con la ruta que hay que llamar.
#[derive(Debug, Clone)]
pub enum AnswerOutcome {
  Batch(BatchOutcome),
  ReadyToFinalize { next: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizedSession {
  pub session_id: String,
  pub spec_id: String,
  pub compiled_prompt_id: String,
  pub spec: JsonValue,
  pub compiled_prompt: CompiledPrompt,
  pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegeneratedQuestion {
  #[serde(flatten)]
  pub question: QuestionView,
  pub replaces: String,
  pub origin: &'static str,
}

/// Orquesta el asistente de preguntas: generación inicial (agentes A y B),
/// navegación, síntesis final (agente C) y regeneración de preguntas.
#[derive(Clone)]
pub struct WizardService {
  ctx: WorkflowContext,
}

impl WizardService {
  pub fn new(ctx: WorkflowContext) -> Self {
    Self { ctx }
  }

  /// Abre una sesión `active`, genera sus preguntas y devuelve el primer
  /// lote. Si la generación falla la sesión queda en `error`.
  pub async fn start_session(&self,
                             owner_id: Option<&str>,
                             initial_description: &str,
                             kind: Option<String>)
                             -> Result<StartedSession, WorkflowError> {
    if initial_description.trim().is_empty() {
      return Err(WorkflowError::Validation("initial_description is required".into()));
    }
    if let Some(k) = &kind {
      let len = k.chars().count();
      if len == 0 || len > MAX_KIND_LEN {
        return Err(WorkflowError::Validation(format!("kind must be between 1 and {} characters", MAX_KIND_LEN)));
      }
    }

    let owner = owner_id.unwrap_or(DEMO_USER_ID).to_string();
    let session = QuestionSession::new(Some(owner), initial_description, kind);
    self.ctx.wizard.open_session(&session)?;

    let drafts = match self.generate_questions(&session).await {
      Ok(d) => d,
      Err(err) => {
        self.mark_error(&session.id, &err);
        return Err(err);
      }
    };
    self.ctx.wizard.add_questions(&session.id, drafts)?;
    let questions = self.ctx.wizard.pending_batch(&session.id)?;
    log::info!("sesión {} iniciada con {} preguntas visibles", session.id, questions.len());
    Ok(StartedSession { session_id: session.id, questions })
  }

  async fn generate_questions(&self, session: &QuestionSession) -> Result<Vec<QuestionDraft>, WorkflowError> {
    let runner = self.ctx.runner();
    let broad = runner.run_logged(&BroadQuestionsAgent { initial_description: session.initial_description.clone(),
                                                         kind: session.kind.clone() },
                                  None,
                                  None)
                      .await?;
    let choice = runner.run_logged(&ChoiceQuestionsAgent { initial_description: session.initial_description.clone(),
                                                           kind: session.kind.clone(),
                                                           broad_questions: broad.output },
                                   None,
                                   None)
                       .await?;
    Ok(choice.output)
  }

  fn mark_error(&self, session_id: &str, err: &WorkflowError) {
    log::error!("sesión {} marcada como error: {}", session_id, err);
    if let Err(e) = self.ctx.wizard.repository().set_status(session_id, SessionStatus::Error) {
      log::error!("no se pudo marcar la sesión {}: {}", session_id, e);
    }
  }

  pub fn get_session(&self, session_id: &str) -> Result<(QuestionSession, SessionProgress), WorkflowError> {
    let session = self.ctx.wizard.session(session_id)?;
    let progress = self.ctx.wizard.progress(session_id)?;
    Ok((session, progress))
  }

  /// Guarda respuestas o aplica un control. `Skip` usa el `question_id` de la
  /// primera respuesta.
  pub fn answer(&self,
                session_id: &str,
                answers: &[AnswerInput],
                control: Option<AnswerControl>)
                -> Result<AnswerOutcome, WorkflowError> {
    self.ctx.wizard.session(session_id)?;
    if answers.is_empty() {
      return Err(WorkflowError::Validation("answers must contain at least one item".into()));
    }
    match control {
      Some(AnswerControl::Back) => Ok(AnswerOutcome::Batch(self.ctx.wizard.go_back(session_id)?)),
      Some(AnswerControl::Skip) => Ok(AnswerOutcome::Batch(self.ctx.wizard.skip(session_id, &answers[0].question_id)?)),
      None => {
        let outcome = self.ctx.wizard.answer(session_id, answers)?;
        if outcome.done {
          Ok(AnswerOutcome::ReadyToFinalize { next: format!("/api/question-sessions/{}/finalize", session_id) })
        } else {
          Ok(AnswerOutcome::Batch(outcome))
        }
      }
    }
  }

  /// Sintetiza la spec con el agente C, la compila y la persiste junto con
  /// el prompt compilado. La sesión termina `completed`, o `error` si algo
  /// falla después de cargarla.
  pub async fn finalize(&self, session_id: &str) -> Result<FinalizedSession, WorkflowError> {
    let session = self.ctx.wizard.session(session_id)?;
    if session.status == SessionStatus::Completed {
      return Err(WorkflowError::Conflict("Session already finalized".into()));
    }
    match self.synthesize(&session).await {
      Ok(done) => Ok(done),
      Err(err) => {
        self.mark_error(session_id, &err);
        Err(err)
      }
    }
  }

  async fn synthesize(&self, session: &QuestionSession) -> Result<FinalizedSession, WorkflowError> {
    let qa_pairs = self.ctx.wizard.qa_pairs(&session.id)?;
    let agent = SpecSynthesisAgent { initial_description: session.initial_description.clone(),
                                     kind: session.kind.clone(),
                                     qa_pairs };
    let result = self.ctx.runner().run_logged(&agent, None, None).await?.output;

    let spec_json = JsonValue::Object(result.spec);
    let compiled = compile_spec_to_prompt(&spec_json);
    let owner = session.owner_id.as_deref().unwrap_or(DEMO_USER_ID);

    let spec = self.ctx
                   .domain_repo
                   .create_spec(Spec::from_generated(owner, &session.id, session.kind.as_deref(), spec_json.clone()))?;
    let record = self.ctx
                     .domain_repo
                     .save_compiled_prompt(CompiledPromptRecord::from_compiled(&spec.id, &compiled))?;
    self.ctx.wizard.repository().complete_session(&session.id,
                                                  result.intent.map(JsonValue::Object),
                                                  spec_json.clone(),
                                                  serde_json::to_value(&compiled.blocks)?,
                                                  Some(result.explanation.clone()))?;
    log::info!("sesión {} finalizada: spec {} y prompt {}", session.id, spec.id, record.id);

    Ok(FinalizedSession { session_id: session.id.clone(),
                          spec_id: spec.id,
                          compiled_prompt_id: record.id,
                          spec: spec_json,
                          compiled_prompt: compiled,
                          explanation: result.explanation })
  }

  pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, WorkflowError> {
    Ok(self.ctx.wizard.snapshot(session_id)?)
  }

  pub fn latest_snapshot(&self, session_id: &str) -> Result<SessionSnapshot, WorkflowError> {
    Ok(self.ctx.wizard.latest_snapshot(session_id)?)
  }

  /// Genera preguntas nuevas y sustituye `question_id` por una del mismo
  /// tipo elegida al azar (o la primera si no hay ninguna de ese tipo).
  pub async fn regenerate_question(&self,
                                   session_id: &str,
                                   question_id: &str)
                                   -> Result<RegeneratedQuestion, WorkflowError> {
    let session = self.ctx.wizard.session(session_id)?;
    let old = self.ctx
                  .wizard
                  .repository()
                  .get_question(session_id, question_id)?
                  .ok_or_else(|| WorkflowError::NotFound("Question not found".into()))?;

    let drafts = self.generate_questions(&session).await?;
    let draft = pick_replacement(drafts, &old.question_type)
      .ok_or_else(|| WorkflowError::invalid_output("B", "no questions generated"))?;
    let fresh = self.ctx.wizard.replace_question(session_id, question_id, draft)?;
    log::info!("pregunta {} regenerada como {}", question_id, fresh.id);
    Ok(RegeneratedQuestion { question: fresh.view(), replaces: question_id.to_string(), origin: "regenerated" })
  }
}

fn pick_replacement(drafts: Vec<QuestionDraft>, question_type: &wizard::QuestionType) -> Option<QuestionDraft> {
  let same: Vec<&QuestionDraft> = drafts.iter().filter(|d| &d.question_type == question_type).collect();
  if let Some(choice) = same.choose(&mut rand::thread_rng()) {
    return Some((*choice).clone());
  }
  drafts.into_iter().next()
}

