// sessions.rs
//
// Rutas del asistente de preguntas.
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, UserId};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use promptly_workflow::services::{AnswerControl, AnswerOutcome};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use wizard::AnswerInput;

const QUESTION_ENGINE_FAILED: &str = "Question engine failed";

#[derive(Debug, Deserialize)]
pub struct StartBody {
  #[serde(default)]
  pub initial_description: String,
  #[serde(default)]
  pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
  Back,
  Skip,
}

impl From<Control> for AnswerControl {
  fn from(c: Control) -> Self {
    match c {
      Control::Back => AnswerControl::Back,
      Control::Skip => AnswerControl::Skip,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  #[serde(default)]
  pub answers: Vec<AnswerInput>,
  #[serde(default)]
  pub control: Option<Control>,
}

pub async fn start(State(state): State<AppState>,
                   UserId(user_id): UserId,
                   ApiJson(body): ApiJson<StartBody>)
                   -> ApiResult<Json<JsonValue>> {
  let started = state.wizard
                     .start_session(Some(&user_id), &body.initial_description, body.kind)
                     .await
                     .map_err(|e| ApiError::from_workflow(e, QUESTION_ENGINE_FAILED))?;
  Ok(Json(json!({ "ok": true, "session_id": started.session_id, "questions": started.questions })))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let (session, progress) = state.wizard.get_session(&id)?;
  Ok(Json(json!({ "ok": true, "session": session, "progress": progress })))
}

pub async fn answer(State(state): State<AppState>,
                    Path(id): Path<String>,
                    ApiJson(body): ApiJson<AnswerBody>)
                    -> ApiResult<Json<JsonValue>> {
  match state.wizard.answer(&id, &body.answers, body.control.map(Into::into))? {
    AnswerOutcome::Batch(batch) => {
      let mut out = json!({ "ok": true, "done": batch.done, "questions": batch.questions });
      if let Some(message) = batch.message {
        out["message"] = JsonValue::String(message);
      }
      Ok(Json(out))
    }
    AnswerOutcome::ReadyToFinalize { next } => Ok(Json(json!({ "ok": true, "done": true, "next": next }))),
  }
}

pub async fn finalize(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let done = state.wizard
                  .finalize(&id)
                  .await
                  .map_err(|e| ApiError::from_workflow(e, QUESTION_ENGINE_FAILED))?;
  Ok(Json(json!({
    "ok": true,
    "session_id": done.session_id,
    "spec_id": done.spec_id,
    "compiled_prompt_id": done.compiled_prompt_id,
    "spec": done.spec,
    "compiled_prompt": done.compiled_prompt,
    "explanation": done.explanation,
  })))
}

pub async fn snapshot(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let snap = state.wizard.snapshot(&id)?;
  Ok(Json(json!({ "ok": true, "snapshot_id": snap.id, "message": "Snapshot saved" })))
}

pub async fn latest_snapshot(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let snap = state.wizard.latest_snapshot(&id)?;
  Ok(Json(json!({ "ok": true, "snapshot_id": snap.id, "snapshot": snap.snapshot, "created_at": snap.created_at })))
}

pub async fn regenerate(State(state): State<AppState>,
                        Path((id, question_id)): Path<(String, String)>)
                        -> ApiResult<Json<JsonValue>> {
  let question = state.wizard
                      .regenerate_question(&id, &question_id)
                      .await
                      .map_err(|e| ApiError::from_workflow(e, "Question regeneration failed"))?;
  Ok(Json(json!({ "ok": true, "question": question, "message": "Question regenerated successfully" })))
}
