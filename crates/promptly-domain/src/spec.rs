// spec.rs
//
// Spec de proyecto: un objeto JSON libre (`spec`) más columnas estructuradas
// (kind, summary, tech_stack, pages, data_model, constraints) que permiten
// filtrar y listar sin abrir el JSON.
use crate::ids::{new_id, now_ts};
use crate::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;
pub const WIZARD_SPEC_TITLE: &str = "Wizard-generated Spec";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpecStatus {
  #[default]
  Draft,
  Compiled,
  Archived,
}

impl SpecStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      SpecStatus::Draft => "draft",
      SpecStatus::Compiled => "compiled",
      SpecStatus::Archived => "archived",
    }
  }
}

impl fmt::Display for SpecStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SpecStatus {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "draft" => Ok(SpecStatus::Draft),
      "compiled" => Ok(SpecStatus::Compiled),
      "archived" => Ok(SpecStatus::Archived),
      other => Err(DomainError::ValidationError(format!("Invalid spec status: {}", other))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TechStack {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub frontend: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub backend: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub frameworks: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
  pub route: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub purpose: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub components: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModelEntity {
  pub entity: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fields: Option<Vec<JsonValue>>,
}

/// Cuerpo aceptado tanto al crear como al modificar (PATCH) una spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecInput {
  pub title: String,
  #[serde(default)]
  pub kind: Option<String>,
  #[serde(default)]
  pub summary: Option<String>,
  #[serde(default)]
  pub tech_stack: Option<TechStack>,
  #[serde(default)]
  pub pages: Option<Vec<PageInput>>,
  #[serde(default)]
  pub data_model: Option<Vec<DataModelEntity>>,
  #[serde(default)]
  pub constraints: Option<Map<String, JsonValue>>,
  #[serde(default)]
  pub status: Option<SpecStatus>,
  pub spec: Map<String, JsonValue>,
}

impl SpecInput {
  pub fn validate(&self) -> Result<(), DomainError> {
    if self.title.is_empty() {
      return Err(DomainError::ValidationError("title is required".to_string()));
    }
    Ok(())
  }

  fn tech_stack_json(&self) -> Result<Option<JsonValue>, DomainError> {
    Ok(match &self.tech_stack {
      Some(t) => Some(serde_json::to_value(t)?),
      None => None,
    })
  }

  fn pages_json(&self) -> Result<Option<JsonValue>, DomainError> {
    Ok(match &self.pages {
      Some(p) => Some(serde_json::to_value(p)?),
      None => None,
    })
  }

  fn data_model_json(&self) -> Result<Option<JsonValue>, DomainError> {
    Ok(match &self.data_model {
      Some(d) => Some(serde_json::to_value(d)?),
      None => None,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
  pub id: String,
  pub owner_id: String,
  pub project_id: Option<String>,
  pub session_id: Option<String>,
  pub kind: Option<String>,
  pub title: String,
  pub summary: Option<String>,
  pub tech_stack: Option<JsonValue>,
  pub pages: Option<JsonValue>,
  pub data_model: Option<JsonValue>,
  pub constraints: Option<JsonValue>,
  pub spec: JsonValue,
  pub status: SpecStatus,
  pub version: i64,
  pub created_at: String,
  pub updated_at: String,
}

impl Spec {
  /// Construye una spec nueva (versión 1) a partir del cuerpo validado.
  pub fn create(owner_id: &str, input: SpecInput) -> Result<Self, DomainError> {
    input.validate()?;
    let now = now_ts();
    Ok(Self { id: new_id("spec_", 12),
              owner_id: owner_id.to_string(),
              project_id: None,
              session_id: None,
              kind: non_empty(input.kind.clone()),
              title: input.title.clone(),
              summary: non_empty(input.summary.clone()),
              tech_stack: input.tech_stack_json()?,
              pages: input.pages_json()?,
              data_model: input.data_model_json()?,
              constraints: input.constraints.clone().map(JsonValue::Object),
              status: input.status.unwrap_or_default(),
              spec: JsonValue::Object(input.spec),
              version: 1,
              created_at: now.clone(),
              updated_at: now })
  }

  /// Reemplaza la spec con el cuerpo recibido. Los campos estructurados que no
  /// llegan (o llegan vacíos) conservan su valor anterior; `title` y `spec`
  /// siempre se sustituyen. La versión avanza en uno.
  pub fn apply_patch(&self, input: SpecInput) -> Result<Self, DomainError> {
    input.validate()?;
    let mut next = self.clone();
    next.title = input.title.clone();
    next.kind = non_empty(input.kind.clone()).or_else(|| self.kind.clone());
    next.summary = non_empty(input.summary.clone()).or_else(|| self.summary.clone());
    next.tech_stack = input.tech_stack_json()?.or_else(|| self.tech_stack.clone());
    next.pages = input.pages_json()?.or_else(|| self.pages.clone());
    next.data_model = input.data_model_json()?.or_else(|| self.data_model.clone());
    next.constraints = input.constraints.clone().map(JsonValue::Object).or_else(|| self.constraints.clone());
    next.status = input.status.unwrap_or(self.status);
    next.spec = JsonValue::Object(input.spec);
    next.version = self.version + 1;
    next.updated_at = now_ts();
    Ok(next)
  }

  /// Construye la spec sintetizada por el asistente de preguntas. Las columnas
  /// estructuradas se extraen del JSON generado aceptando alias camelCase.
  pub fn from_generated(owner_id: &str, session_id: &str, session_kind: Option<&str>, spec: JsonValue) -> Self {
    let kind = truthy_str(spec.get("kind")).or_else(|| session_kind.map(str::to_string));
    let title = truthy_str(spec.get("title")).unwrap_or_else(|| WIZARD_SPEC_TITLE.to_string());
    let summary = truthy_str(spec.get("summary")).or_else(|| truthy_str(spec.get("description")));
    let tech_stack = truthy_value(spec.get("tech_stack")).or_else(|| truthy_value(spec.get("techStack")));
    let pages = non_empty_array(spec.get("pages"));
    let data_model = non_empty_array(spec.get("data_model").filter(|v| is_truthy(v)).or_else(|| spec.get("dataModel")));
    let constraints = truthy_value(spec.get("constraints"));
    let now = now_ts();
    Self { id: new_id("spec_", 12),
           owner_id: owner_id.to_string(),
           project_id: None,
           session_id: Some(session_id.to_string()),
           kind,
           title,
           summary,
           tech_stack,
           pages,
           data_model,
           constraints,
           spec,
           status: SpecStatus::Compiled,
           version: 1,
           created_at: now.clone(),
           updated_at: now }
  }

  pub fn is_owned_by(&self, user_id: &str) -> bool {
    self.owner_id.is_empty() || self.owner_id == user_id
  }

  /// `title` dentro del JSON libre, usado como nombre de tarea.
  pub fn inner_title(&self) -> Option<String> {
    truthy_str(self.spec.get("title"))
  }
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|v| !v.is_empty())
}

/// Veracidad al estilo JavaScript: null, false, 0 y "" son falsos; arrays y
/// objetos (aunque estén vacíos) son verdaderos.
pub fn is_truthy(v: &JsonValue) -> bool {
  match v {
    JsonValue::Null => false,
    JsonValue::Bool(b) => *b,
    JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
    JsonValue::String(s) => !s.is_empty(),
    JsonValue::Array(_) | JsonValue::Object(_) => true,
  }
}

fn truthy_value(v: Option<&JsonValue>) -> Option<JsonValue> {
  v.filter(|v| is_truthy(v)).cloned()
}

fn truthy_str(v: Option<&JsonValue>) -> Option<String> {
  match truthy_value(v)? {
    JsonValue::String(s) => Some(s),
    other => Some(other.to_string()),
  }
}

fn non_empty_array(v: Option<&JsonValue>) -> Option<JsonValue> {
  match v {
    Some(JsonValue::Array(items)) if !items.is_empty() => Some(JsonValue::Array(items.clone())),
    _ => None,
  }
}

/// Filtros del listado de specs, ya normalizados.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFilter {
  pub owner_id: String,
  pub project_id: Option<String>,
  pub status: Option<String>,
  pub kind: Option<String>,
  pub q: Option<String>,
  pub limit: i64,
  pub offset: i64,
}

impl SpecFilter {
  pub fn for_owner(owner_id: &str) -> Self {
    Self { owner_id: owner_id.to_string(),
           project_id: None,
           status: None,
           kind: None,
           q: None,
           limit: DEFAULT_LIST_LIMIT,
           offset: 0 }
  }

  /// Término de búsqueda recortado, o `None` si está vacío.
  pub fn search_term(&self) -> Option<&str> {
    self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
  }

  /// Evalúa el filtro en memoria (la búsqueda no distingue mayúsculas ASCII).
  pub fn matches(&self, spec: &Spec) -> bool {
    if spec.owner_id != self.owner_id {
      return false;
    }
    if let Some(p) = &self.project_id {
      if spec.project_id.as_ref() != Some(p) {
        return false;
      }
    }
    if let Some(s) = &self.status {
      if spec.status.as_str() != s {
        return false;
      }
    }
    if let Some(k) = &self.kind {
      if spec.kind.as_ref() != Some(k) {
        return false;
      }
    }
    if let Some(term) = self.search_term() {
      // mismo criterio que LIKE en SQLite: solo se pliegan mayúsculas ASCII
      let term = term.to_ascii_lowercase();
      let in_title = spec.title.to_ascii_lowercase().contains(&term);
      let in_summary = spec.summary.as_deref().map(|s| s.to_ascii_lowercase().contains(&term)).unwrap_or(false);
      if !in_title && !in_summary {
        return false;
      }
    }
    true
  }
}

/// `limit` ausente, no numérico o menor que 1 -> 20; mayor que 100 -> 100.
pub fn parse_limit(raw: Option<&str>) -> i64 {
  match raw.and_then(parse_leading_int) {
    Some(n) if n >= 1 => n.min(MAX_LIST_LIMIT),
    _ => DEFAULT_LIST_LIMIT,
  }
}

/// `offset` ausente, no numérico o negativo -> 0.
pub fn parse_offset(raw: Option<&str>) -> i64 {
  match raw.and_then(parse_leading_int) {
    Some(n) if n >= 0 => n,
    _ => 0,
  }
}

/// Lee el entero al inicio de la cadena ("15abc" -> 15).
pub fn parse_leading_int(raw: &str) -> Option<i64> {
  let s = raw.trim();
  let (sign, digits) = match s.strip_prefix('-') {
    Some(rest) => (-1, rest),
    None => (1, s.strip_prefix('+').unwrap_or(s)),
  };
  let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
  if end == 0 {
    return None;
  }
  digits[..end].parse::<i64>().ok().map(|n| n * sign)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn pagination_is_clamped() {
    assert_eq!(parse_limit(None), 20);
    assert_eq!(parse_limit(Some("0")), 20);
    assert_eq!(parse_limit(Some("abc")), 20);
    assert_eq!(parse_limit(Some("500")), 100);
    assert_eq!(parse_limit(Some("15abc")), 15);
    assert_eq!(parse_offset(Some("-3")), 0);
    assert_eq!(parse_offset(Some("7")), 7);
  }

  #[test]
  fn generated_spec_extracts_aliases() {
    let s = Spec::from_generated("demo-user",
                                 "sess_1",
                                 Some("webapp"),
                                 json!({"description": "d", "techStack": {"frontend": "react"}, "dataModel": [{"entity": "User"}], "pages": []}));
    assert_eq!(s.title, WIZARD_SPEC_TITLE);
    assert_eq!(s.kind.as_deref(), Some("webapp"));
    assert_eq!(s.summary.as_deref(), Some("d"));
    assert_eq!(s.tech_stack, Some(json!({"frontend": "react"})));
    assert_eq!(s.data_model, Some(json!([{"entity": "User"}])));
    assert_eq!(s.pages, None);
    assert_eq!(s.status, SpecStatus::Compiled);
  }
}
