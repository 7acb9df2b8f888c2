// docs.rs
//
// Documentos del usuario autenticado. La edición usa `baseVersion`: si no
// coincide con la versión guardada el contenido se fusiona y se responde 409
// con el documento resultante.
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, AuthUser};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use promptly_domain::{Doc, DocUpdate};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Deserialize)]
pub struct CreateDocBody {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocBody {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub content: Option<String>,
  #[serde(default)]
  pub base_version: Option<i64>,
}

fn owned_doc(state: &AppState, id: &str, owner_id: &str) -> ApiResult<Doc> {
  match state.domain.get_doc(id)? {
    Some(doc) if doc.owner_id == owner_id => Ok(doc),
    _ => Err(ApiError::NotFound("Not found".into())),
  }
}

pub async fn list(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<JsonValue>> {
  let items = state.domain.list_docs(&user.id)?;
  Ok(Json(json!({ "ok": true, "items": items })))
}

pub async fn create(State(state): State<AppState>,
                    AuthUser(user): AuthUser,
                    ApiJson(body): ApiJson<CreateDocBody>)
                    -> ApiResult<Response> {
  let doc = state.domain.create_doc(Doc::new(&user.id, &body.title, &body.content)?)?;
  tracing::info!("documento {} creado por {}", doc.id, user.id);
  Ok((StatusCode::CREATED, Json(json!({ "ok": true, "item": doc }))).into_response())
}

pub async fn read(State(state): State<AppState>,
                  AuthUser(user): AuthUser,
                  Path(id): Path<String>)
                  -> ApiResult<Json<JsonValue>> {
  let doc = owned_doc(&state, &id, &user.id)?;
  Ok(Json(json!({ "ok": true, "item": doc })))
}

pub async fn update(State(state): State<AppState>,
                    AuthUser(user): AuthUser,
                    Path(id): Path<String>,
                    ApiJson(body): ApiJson<UpdateDocBody>)
                    -> ApiResult<Response> {
  let base_version = body.base_version.ok_or_else(|| ApiError::bad_request("Missing baseVersion"))?;
  let current = owned_doc(&state, &id, &user.id)?;
  match current.apply_edit(body.title.as_deref(), body.content.as_deref(), base_version)? {
    DocUpdate::Applied(doc) => {
      state.domain.update_doc(&doc)?;
      Ok(Json(json!({ "ok": true, "item": doc })).into_response())
    }
    DocUpdate::Merged(doc) => {
      state.domain.update_doc(&doc)?;
      tracing::info!("documento {} fusionado: base {} frente a {}", doc.id, base_version, current.version);
      Ok((StatusCode::CONFLICT, Json(json!({ "ok": false, "conflict": true, "item": doc }))).into_response())
    }
  }
}

pub async fn delete(State(state): State<AppState>,
                    AuthUser(user): AuthUser,
                    Path(id): Path<String>)
                    -> ApiResult<Json<JsonValue>> {
  if !state.domain.delete_doc(&id, &user.id)? {
    return Err(ApiError::NotFound("Not found".into()));
  }
  Ok(Json(json!({ "ok": true })))
}
