// doc.rs
use crate::ids::{new_id, now_ts, parse_ts, random_token};
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TITLE_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
  pub id: String,
  pub owner_id: String,
  pub title: String,
  pub content: String,
  pub version: i64,
  pub created_at: String,
  pub updated_at: String,
}

/// Resultado de aplicar una edición sobre un documento.
#[derive(Debug, Clone, PartialEq)]
pub enum DocUpdate {
  /// La versión base coincidía; el contenido se reemplazó.
  Applied(Doc),
  /// La versión base era antigua; el contenido se fusionó por concatenación.
  Merged(Doc),
}

impl Doc {
  pub fn new(owner_id: &str, title: &str, content: &str) -> Result<Self, DomainError> {
    validate_title(title)?;
    let now = now_ts();
    Ok(Self { id: new_id("", 16),
              owner_id: owner_id.to_string(),
              title: title.to_string(),
              content: content.to_string(),
              version: 1,
              created_at: now.clone(),
              updated_at: now })
  }

  /// Aplica una edición con control optimista. Si `base_version` no coincide
  /// se fusiona el contenido entrante con el actual en lugar de descartarlo.
  /// En ambos casos la versión avanza en uno.
  pub fn apply_edit(&self, title: Option<&str>, content: Option<&str>, base_version: i64) -> Result<DocUpdate, DomainError> {
    let title = match title.filter(|t| !t.is_empty()) {
      Some(t) => {
        validate_title(t)?;
        t.to_string()
      }
      None => self.title.clone(),
    };
    let now = now_ts();
    let mut next = self.clone();
    next.title = title;
    next.version = self.version + 1;
    next.updated_at = now.clone();
    let incoming = content.unwrap_or("");
    if self.version != base_version {
      next.content = merge_content(&self.content, incoming, &now);
      Ok(DocUpdate::Merged(next))
    } else {
      next.content = incoming.to_string();
      Ok(DocUpdate::Applied(next))
    }
  }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
  let len = title.chars().count();
  if len == 0 || len > TITLE_MAX {
    return Err(DomainError::ValidationError("Invalid body".to_string()));
  }
  Ok(())
}

/// Fusión ingenua: si el contenido difiere se anexa tras un separador con la
/// marca de tiempo de la fusión.
pub fn merge_content(base: &str, incoming: &str, ts: &str) -> String {
  if base == incoming {
    return base.to_string();
  }
  format!("{}\n\n----- MERGED SECTION ({}) -----\n\n{}", base, ts, incoming)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareMode {
  View,
  Edit,
}

impl ShareMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ShareMode::View => "view",
      ShareMode::Edit => "edit",
    }
  }
}

impl fmt::Display for ShareMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ShareMode {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "view" => Ok(ShareMode::View),
      "edit" => Ok(ShareMode::Edit),
      other => Err(DomainError::ValidationError(format!("Invalid share mode: {}", other))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
  pub id: String,
  pub doc_id: String,
  pub token: String,
  pub mode: ShareMode,
  pub created_at: String,
  pub expires_at: Option<String>,
}

impl Share {
  pub fn new(doc_id: &str, mode: ShareMode, expires_at: Option<String>) -> Result<Self, DomainError> {
    if let Some(raw) = &expires_at {
      if parse_ts(raw).is_none() {
        return Err(DomainError::ValidationError(format!("Invalid expiresAt: {}", raw)));
      }
    }
    Ok(Self { id: new_id("", 12),
              doc_id: doc_id.to_string(),
              token: random_token(24),
              mode,
              created_at: now_ts(),
              expires_at })
  }

  /// Un enlace sin `expires_at` no caduca.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.as_deref().and_then(parse_ts).map(|exp| exp <= now).unwrap_or(false)
  }

  pub fn url(&self, link_base: &str) -> String {
    format!("{}{}", link_base, self.token)
  }
}
