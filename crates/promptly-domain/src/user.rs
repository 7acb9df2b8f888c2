// user.rs
use crate::ids::{new_id, now_ts};
use crate::DomainError;
use serde::{Deserialize, Serialize};

/// Usuario sembrado por la migración inicial; se usa como propietario por
/// defecto de specs y sesiones cuando la petición no trae identidad.
pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_USER_EMAIL: &str = "demo@promptly.local";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub email: String,
  pub created_at: String,
}

impl User {
  pub fn new(email: &str) -> Result<Self, DomainError> {
    let email = normalize_email(email)?;
    Ok(Self { id: new_id("", 16), email, created_at: now_ts() })
  }

  pub fn demo() -> Self {
    Self { id: DEMO_USER_ID.to_string(),
           email: DEMO_USER_EMAIL.to_string(),
           created_at: now_ts() }
  }
}

/// Recorta y pasa a minúsculas. Exige un `@` con texto a ambos lados.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
  let email = raw.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
    _ => Err(DomainError::ValidationError(format!("Invalid email: {}", raw))),
  }
}
