// run.rs
use crate::ids::{new_id, now_ts};
use crate::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RUN_LIMIT: i64 = 50;
pub const MAX_RUN_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
  Pending,
  Success,
  Failed,
}

impl RunStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      RunStatus::Pending => "pending",
      RunStatus::Success => "success",
      RunStatus::Failed => "failed",
    }
  }
}

impl fmt::Display for RunStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RunStatus {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(RunStatus::Pending),
      "success" => Ok(RunStatus::Success),
      "failed" => Ok(RunStatus::Failed),
      other => Err(DomainError::ValidationError(format!("Invalid run status: {}", other))),
    }
  }
}

/// Registro de una llamada al LLM (o de una ejecución externa reportada por el
/// usuario). `input_blocks` y `raw_output` son JSON arbitrario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
  pub id: String,
  pub spec_id: Option<String>,
  pub spec_version: Option<String>,
  pub model: Option<String>,
  pub status: RunStatus,
  pub input_blocks: Option<JsonValue>,
  pub raw_output: Option<JsonValue>,
  pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewRun {
  #[serde(default)]
  pub spec_id: Option<String>,
  #[serde(default)]
  pub spec_version: Option<String>,
  pub model: String,
  #[serde(default)]
  pub input_blocks: Option<JsonValue>,
}

impl Run {
  /// Crea un run en estado `pending`.
  pub fn pending(new: NewRun) -> Result<Self, DomainError> {
    if new.model.is_empty() {
      return Err(DomainError::ValidationError("model is required".to_string()));
    }
    Ok(Self { id: new_id("run_", 16),
              spec_id: new.spec_id.filter(|s| !s.is_empty()),
              spec_version: new.spec_version.filter(|s| !s.is_empty()),
              model: Some(new.model),
              status: RunStatus::Pending,
              input_blocks: new.input_blocks,
              raw_output: None,
              created_at: now_ts() })
  }

  /// Salida cruda como texto, tal como la ve el clasificador de errores.
  pub fn raw_output_text(&self) -> String {
    match &self.raw_output {
      Some(JsonValue::String(s)) => s.clone(),
      Some(other) => other.to_string(),
      None => String::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
  pub id: String,
  pub run_id: String,
  pub error_type: String,
  pub details: String,
  pub detected_by: String,
  pub created_at: String,
}

impl RunError {
  pub fn new(run_id: &str, error_type: &str, details: &str, detected_by: &str) -> Self {
    Self { id: new_id("err_", 16),
           run_id: run_id.to_string(),
           error_type: error_type.to_string(),
           details: details.to_string(),
           detected_by: detected_by.to_string(),
           created_at: now_ts() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFilter {
  pub spec_id: Option<String>,
  pub status: Option<String>,
  pub limit: i64,
}

impl Default for RunFilter {
  fn default() -> Self {
    Self { spec_id: None, status: None, limit: DEFAULT_RUN_LIMIT }
  }
}

impl RunFilter {
  pub fn matches(&self, run: &Run) -> bool {
    self.spec_id.as_ref().map(|s| run.spec_id.as_ref() == Some(s)).unwrap_or(true)
    && self.status.as_deref().map(|s| run.status.as_str() == s).unwrap_or(true)
  }
}

/// Límite del listado de runs: por defecto 50, acotado a 1..=500.
pub fn parse_run_limit(raw: Option<&str>) -> i64 {
  match raw.and_then(crate::spec::parse_leading_int) {
    Some(n) if n >= 1 => n.min(MAX_RUN_LIMIT),
    _ => DEFAULT_RUN_LIMIT,
  }
}
