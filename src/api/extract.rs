// extract.rs
//
// Extractores propios: cuerpo JSON con rechazo en formato `{ok:false}` e
// identidad del usuario a partir de `X-User-Id`.
use crate::api::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use promptly_domain::{User, DEMO_USER_ID};
use serde::de::DeserializeOwned;

pub const USER_HEADER: &str = "x-user-id";

/// `Json<T>` cuyo rechazo se convierte en un 400 con el sobre de error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Cuerpo JSON opcional: vacío equivale a `T::default()`.
pub fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(T::default());
  }
  serde_json::from_slice(body).map_err(|e| ApiError::BadRequest { message: "Invalid request body".to_string(),
                                                                    details: Some(e.to_string().into()) })
}

fn header_user(parts: &Parts) -> Option<String> {
  parts.headers
       .get(USER_HEADER)
       .and_then(|v| v.to_str().ok())
       .map(str::trim)
       .filter(|v| !v.is_empty())
       .map(str::to_string)
}

/// Usuario de la petición; sin cabecera se usa `demo-user`. Un id que no
/// existe se rechaza con 401, igual que en `AuthUser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

#[async_trait]
impl FromRequestParts<AppState> for UserId {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
    let Some(id) = header_user(parts) else {
      return Ok(UserId(DEMO_USER_ID.to_string()));
    };
    match state.domain.get_user(&id)? {
      Some(user) => Ok(UserId(user.id)),
      None => Err(ApiError::Unauthorized("Unknown user".into())),
    }
  }
}

/// Usuario existente exigido por documentos y enlaces compartidos.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
    let id = header_user(parts).ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".into()))?;
    match state.domain.get_user(&id)? {
      Some(user) => Ok(AuthUser(user)),
      None => Err(ApiError::Unauthorized("Unknown user".into())),
    }
  }
}
