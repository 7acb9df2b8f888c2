use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Deserialize)]
pub struct EnsureUserBody {
  #[serde(default)]
  pub email: String,
}

/// Devuelve el usuario con ese email, creándolo si no existe.
pub async fn ensure_user(State(state): State<AppState>,
                         ApiJson(body): ApiJson<EnsureUserBody>)
                         -> ApiResult<Json<JsonValue>> {
  let user = state.domain.ensure_user(&body.email)?;
  Ok(Json(json!({ "ok": true, "user": user })))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JsonValue>> {
  let user = state.domain.get_user(&id)?.ok_or_else(|| ApiError::NotFound("User not found".into()))?;
  Ok(Json(json!({ "ok": true, "user": user })))
}
