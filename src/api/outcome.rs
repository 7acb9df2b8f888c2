// outcome.rs
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use promptly_workflow::services::OutcomeRequest;
use serde_json::{json, Value as JsonValue};

pub async fn generate(State(state): State<AppState>,
                      ApiJson(request): ApiJson<OutcomeRequest>)
                      -> ApiResult<Json<JsonValue>> {
  let result = state.outcome
                    .generate(request)
                    .await
                    .map_err(|e| ApiError::from_workflow(e, "Outcome generation failed"))?;
  Ok(Json(json!({ "ok": true, "result": result })))
}
