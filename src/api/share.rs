use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{optional_body, AuthUser};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use promptly_domain::{Share, ShareMode};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBody {
  #[serde(default)]
  pub mode: Option<String>,
  #[serde(default)]
  pub expires_at: Option<String>,
}

/// Crea un enlace para un documento propio. El modo por defecto es `view`.
pub async fn create(State(state): State<AppState>,
                    AuthUser(user): AuthUser,
                    Path(doc_id): Path<String>,
                    body: Bytes)
                    -> ApiResult<Json<JsonValue>> {
  let body: ShareBody = optional_body(&body)?;
  match state.domain.get_doc(&doc_id)? {
    Some(doc) if doc.owner_id == user.id => {}
    _ => return Err(ApiError::NotFound("Not found".into())),
  }
  let mode = match body.mode.as_deref() {
    Some(raw) => raw.parse::<ShareMode>()?,
    None => ShareMode::View,
  };
  let share = state.domain.create_share(Share::new(&doc_id, mode, body.expires_at)?)?;
  Ok(Json(json!({
    "ok": true,
    "url": share.url(&state.settings.link_base),
    "token": share.token,
    "mode": share.mode,
    "id": share.id,
  })))
}

/// Resuelve un token a su documento. Los enlaces caducados no existen.
pub async fn resolve(State(state): State<AppState>, Path(token): Path<String>) -> ApiResult<Json<JsonValue>> {
  let share = state.domain
                   .get_share_by_token(&token)?
                   .filter(|s| !s.is_expired(Utc::now()))
                   .ok_or_else(|| ApiError::NotFound("Invalid".into()))?;
  let doc = state.domain.get_doc(&share.doc_id)?.ok_or_else(|| ApiError::NotFound("Invalid".into()))?;
  Ok(Json(json!({
    "ok": true,
    "mode": share.mode,
    "doc": {
      "id": doc.id,
      "title": doc.title,
      "content": doc.content,
      "version": doc.version,
      "updated_at": doc.updated_at,
    },
  })))
}
