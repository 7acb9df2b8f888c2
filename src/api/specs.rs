// specs.rs
//
// CRUD de specs, compilación a prompt y evaluación. Las specs de otro
// propietario responden 404 igual que las inexistentes.
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{optional_body, ApiJson, UserId};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use promptly_domain::{parse_limit, parse_offset, Spec, SpecFilter, SpecInput};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateBody {
  #[serde(default)]
  pub model: Option<String>,
}

fn non_empty(query: &HashMap<String, String>, key: &str) -> Option<String> {
  query.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Fila del listado: columnas estructuradas sin el JSON libre.
fn list_item(spec: &Spec) -> JsonValue {
  json!({
    "id": spec.id,
    "owner_id": spec.owner_id,
    "project_id": spec.project_id,
    "kind": spec.kind,
    "title": spec.title,
    "summary": spec.summary,
    "status": spec.status,
    "version": spec.version,
    "tech_stack": spec.tech_stack.clone().unwrap_or_else(|| json!({})),
    "pages": spec.pages.clone().unwrap_or_else(|| json!([])),
    "data_model": spec.data_model.clone().unwrap_or_else(|| json!([])),
    "constraints": spec.constraints,
    "created_at": spec.created_at,
    "updated_at": spec.updated_at,
  })
}

pub async fn list(State(state): State<AppState>,
                  UserId(user_id): UserId,
                  Query(query): Query<HashMap<String, String>>)
                  -> ApiResult<Json<JsonValue>> {
  let owner = non_empty(&query, "owner_id").unwrap_or(user_id);
  let filter = SpecFilter { project_id: non_empty(&query, "project_id"),
                            status: non_empty(&query, "status"),
                            kind: non_empty(&query, "kind"),
                            q: non_empty(&query, "q"),
                            limit: parse_limit(query.get("limit").map(String::as_str)),
                            offset: parse_offset(query.get("offset").map(String::as_str)),
                            ..SpecFilter::for_owner(&owner) };
  let (specs, total) = state.specs.list(&filter)?;
  let items: Vec<JsonValue> = specs.iter().map(list_item).collect();
  Ok(Json(json!({
    "ok": true,
    "items": items,
    "pagination": { "limit": filter.limit, "offset": filter.offset, "total": total },
  })))
}

pub async fn create(State(state): State<AppState>,
                    UserId(user_id): UserId,
                    ApiJson(input): ApiJson<SpecInput>)
                    -> ApiResult<Json<JsonValue>> {
  let spec = state.specs.create(&user_id, input)?;
  Ok(Json(json!({ "ok": true, "id": spec.id })))
}

pub async fn read(State(state): State<AppState>,
                  UserId(user_id): UserId,
                  Path(id): Path<String>)
                  -> ApiResult<Json<JsonValue>> {
  let spec = state.specs.get_owned(&id, &user_id)?;
  Ok(Json(json!({
    "ok": true,
    "id": spec.id,
    "kind": spec.kind,
    "title": spec.title,
    "summary": spec.summary,
    "tech_stack": spec.tech_stack,
    "pages": spec.pages.unwrap_or_else(|| json!([])),
    "data_model": spec.data_model.unwrap_or_else(|| json!([])),
    "constraints": spec.constraints,
    "status": spec.status,
    "version": spec.version,
    "spec": spec.spec,
    "created_at": spec.created_at,
    "updated_at": spec.updated_at,
  })))
}

pub async fn update(State(state): State<AppState>,
                    UserId(user_id): UserId,
                    Path(id): Path<String>,
                    ApiJson(input): ApiJson<SpecInput>)
                    -> ApiResult<Json<JsonValue>> {
  let version = state.specs.update(&id, &user_id, input)?;
  Ok(Json(json!({ "ok": true, "version": version })))
}

pub async fn compile(State(state): State<AppState>,
                     UserId(user_id): UserId,
                     Path(id): Path<String>)
                     -> ApiResult<Json<JsonValue>> {
  let compiled = state.specs.compile(&id, &user_id)?;
  Ok(Json(json!({ "ok": true, "id": compiled.record.id, "compiled_prompt": compiled.compiled })))
}

pub async fn evaluate(State(state): State<AppState>,
                      UserId(user_id): UserId,
                      Path(id): Path<String>,
                      body: Bytes)
                      -> ApiResult<Json<JsonValue>> {
  let body: EvaluateBody = optional_body(&body)?;
  let evaluation = state.specs
                        .evaluate(&id, &user_id, body.model.as_deref())
                        .await
                        .map_err(|e| ApiError::from_workflow(e, "Evaluation failed"))?;
  Ok(Json(json!({ "ok": true, "evaluation": evaluation })))
}

pub async fn compile_and_evaluate(State(state): State<AppState>,
                                  UserId(user_id): UserId,
                                  Path(id): Path<String>,
                                  body: Bytes)
                                  -> ApiResult<Json<JsonValue>> {
  let body: EvaluateBody = optional_body(&body)?;
  let (compiled, evaluation) = state.specs
                                    .compile_and_evaluate(&id, &user_id, body.model.as_deref())
                                    .await
                                    .map_err(|e| ApiError::from_workflow(e, "Compile and evaluate failed"))?;
  Ok(Json(json!({
    "ok": true,
    "compiled_prompt": {
      "id": compiled.record.id,
      "blocks": compiled.compiled.blocks,
      "explanation": compiled.compiled.explanation,
    },
    "evaluation": evaluation,
  })))
}

pub async fn evaluations(State(state): State<AppState>,
                         UserId(user_id): UserId,
                         Path(id): Path<String>)
                         -> ApiResult<Json<JsonValue>> {
  let evaluations = state.specs.evaluations(&id, &user_id)?;
  Ok(Json(json!({ "ok": true, "evaluations": evaluations })))
}
