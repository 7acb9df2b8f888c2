use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use promptly_domain::ids::now_ts;
use serde_json::{json, Value as JsonValue};

pub async fn health() -> Json<JsonValue> {
  Json(json!({ "ok": true, "status": "healthy", "time": now_ts() }))
}

/// Subconjunto público de la configuración.
pub async fn settings(State(state): State<AppState>) -> Json<JsonValue> {
  let s = &state.settings;
  Json(json!({
    "ok": true,
    "settings": {
      "env": s.app_env,
      "llmEnabled": state.llm_enabled(),
      "defaultModel": s.workflow.default_model,
      "outcomeModel": s.workflow.outcome_model,
      "maxCandidates": s.workflow.max_candidates,
      "features": {
        "questionWizard": true,
        "promptEnhancer": true,
        "outcomeRunner": true,
      },
    },
  }))
}
