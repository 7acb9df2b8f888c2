// runs.rs
//
// Runs externos: registro, errores, plan de reparación y juicio de
// resultados.
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use promptly_domain::{parse_run_limit, NewRun, RunFilter};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
  #[serde(default)]
  pub error_type: Option<String>,
  #[serde(default)]
  pub details: String,
  #[serde(default)]
  pub detected_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeCheckBody {
  #[serde(default)]
  pub outcome_spec_id: String,
  #[serde(default)]
  pub model: Option<String>,
}

pub async fn list(State(state): State<AppState>,
                  Query(query): Query<HashMap<String, String>>)
                  -> ApiResult<Json<JsonValue>> {
  let filter = RunFilter { spec_id: query.get("spec_id").filter(|v| !v.is_empty()).cloned(),
                           status: query.get("status").filter(|v| !v.is_empty()).cloned(),
                           limit: parse_run_limit(query.get("limit").map(String::as_str)) };
  let runs = state.runs.list(&filter)?;
  Ok(Json(json!({ "ok": true, "runs": runs })))
}

pub async fn create(State(state): State<AppState>,
                    ApiJson(new_run): ApiJson<NewRun>)
                    -> ApiResult<(StatusCode, Json<JsonValue>)> {
  let run = state.runs.create(new_run)?;
  Ok((StatusCode::CREATED, Json(json!({ "ok": true, "run": run }))))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let run = state.runs.get(&id)?;
  Ok(Json(json!({ "ok": true, "run": run })))
}

pub async fn errors(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let errors = state.runs.errors(&id)?;
  Ok(Json(json!({ "ok": true, "errors": errors })))
}

pub async fn add_error(State(state): State<AppState>,
                       Path(id): Path<String>,
                       ApiJson(body): ApiJson<ErrorBody>)
                       -> ApiResult<(StatusCode, Json<JsonValue>)> {
  if body.details.trim().is_empty() {
    return Err(ApiError::bad_request("details is required"));
  }
  let error = state.runs.add_error(&id, body.error_type, &body.details, body.detected_by)?;
  Ok((StatusCode::CREATED, Json(json!({ "ok": true, "error": error }))))
}

pub async fn repair(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let repair = state.runs.repair_plan(&id)?;
  Ok(Json(json!({ "ok": true, "repair": repair })))
}

pub async fn outcome_check(State(state): State<AppState>,
                           Path(id): Path<String>,
                           ApiJson(body): ApiJson<OutcomeCheckBody>)
                           -> ApiResult<(StatusCode, Json<JsonValue>)> {
  let check = state.runs
                   .outcome_check(&id, &body.outcome_spec_id, body.model.as_deref())
                   .await
                   .map_err(|e| ApiError::from_workflow(e, "Outcome check failed"))?;
  Ok((StatusCode::CREATED,
      Json(json!({ "ok": true, "outcome_run": check.outcome_run, "metrics": check.metrics }))))
}
