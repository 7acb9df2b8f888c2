// enhancer.rs
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use promptly_workflow::agents::EnhanceMode;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub struct EnhanceBody {
  #[serde(default)]
  pub prompt: String,
}

/// `POST /api/enhancer/:mode`. Un modo desconocido es una ruta inexistente.
pub async fn enhance(State(state): State<AppState>,
                     Path(mode): Path<String>,
                     ApiJson(body): ApiJson<EnhanceBody>)
                     -> ApiResult<Json<JsonValue>> {
  let mode = EnhanceMode::from_str(&mode).map_err(|_| ApiError::NotFound(format!("Unknown enhancer mode: {}", mode)))?;
  let result = state.enhancer
                    .enhance(mode, &body.prompt)
                    .await
                    .map_err(|e| ApiError::from_workflow(e, "Enhancer failed"))?;
  Ok(Json(json!({ "ok": true, "result": result })))
}
