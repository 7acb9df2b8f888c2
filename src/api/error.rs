// error.rs
//
// Único punto donde los errores se convierten en códigos HTTP y en el sobre
// `{ok:false, error[, details]}`.
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use promptly_domain::DomainError;
use promptly_workflow::WorkflowError;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;
use wizard::WizardError;

pub const LLM_DISABLED: &str = "LLM disabled";

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{message}")]
  BadRequest { message: String, details: Option<JsonValue> },
  #[error("{0}")]
  Unauthorized(String),
  #[error("{0}")]
  NotFound(String),
  #[error("{0}")]
  Conflict(String),
  /// El modelo respondió con error o con una salida que no cumple el esquema.
  #[error("{0}")]
  BadGateway(String),
  /// No hay clave de API: las funciones LLM están apagadas.
  #[error("{0}")]
  Unavailable(String),
  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::BadRequest { message: message.into(), details: None }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
      Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Traduce un error de los servicios. Los fallos del modelo usan
  /// `upstream_message`, el mensaje propio de cada operación.
  pub fn from_workflow(err: WorkflowError, upstream_message: &str) -> Self {
    if err.is_llm_disabled() {
      return Self::Unavailable(LLM_DISABLED.to_string());
    }
    if err.is_upstream() {
      tracing::warn!("{}: {}", upstream_message, err);
      return Self::BadGateway(upstream_message.to_string());
    }
    match err {
      WorkflowError::Validation(m) => Self::bad_request(m),
      WorkflowError::NotFound(m) => Self::NotFound(m),
      WorkflowError::Conflict(m) => Self::Conflict(m),
      WorkflowError::Domain(e) => e.into(),
      WorkflowError::Wizard(e) => e.into(),
      other => Self::Internal(other.to_string()),
    }
  }
}

impl From<WorkflowError> for ApiError {
  fn from(err: WorkflowError) -> Self {
    Self::from_workflow(err, "Model call failed")
  }
}

impl From<DomainError> for ApiError {
  fn from(err: DomainError) -> Self {
    match err {
      DomainError::ValidationError(m) => Self::bad_request(m),
      DomainError::NotFound(m) => Self::NotFound(m),
      DomainError::Conflict(m) => Self::Conflict(m),
      other => Self::Internal(other.to_string()),
    }
  }
}

impl From<WizardError> for ApiError {
  fn from(err: WizardError) -> Self {
    match err {
      WizardError::Validation(m) => Self::bad_request(m),
      WizardError::NotFound(m) => Self::NotFound(m),
      WizardError::Conflict(m) => Self::Conflict(m),
      other => Self::Internal(other.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest { message: "Invalid request body".to_string(),
                       details: Some(JsonValue::String(rejection.body_text())) }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match self {
      Self::BadRequest { message, details: Some(details) } => json!({ "ok": false, "error": message, "details": details }),
      Self::Internal(detail) => {
        tracing::error!("error interno: {}", detail);
        json!({ "ok": false, "error": "Internal server error" })
      }
      other => json!({ "ok": false, "error": other.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;
