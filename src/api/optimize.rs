// optimize.rs
//
// Optimización simulada: no llama al modelo, solo genera métricas con una
// tendencia ascendente.
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::optional_body;
use axum::body::Bytes;
use axum::Json;
use promptly_domain::simulate_optimization;
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Default, Deserialize)]
pub struct OptimizeBody {
  #[serde(default)]
  pub task: Option<String>,
}

pub async fn optimize(body: Bytes) -> ApiResult<Json<JsonValue>> {
  let body: OptimizeBody = optional_body(&body)?;
  let report = {
    let mut rng = rand::thread_rng();
    simulate_optimization(body.task.as_deref(), &mut rng)
  };
  let mut out = serde_json::to_value(report).map_err(|e| ApiError::Internal(e.to_string()))?;
  if let JsonValue::Object(map) = &mut out {
    map.insert("ok".into(), JsonValue::Bool(true));
  }
  Ok(Json(out))
}
