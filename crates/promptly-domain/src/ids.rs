// ids.rs
//
// Identificadores y marcas de tiempo compartidos por todas las entidades.
// Los ids son prefijos legibles (`spec_`, `run_`, ...) seguidos de una parte
// aleatoria derivada de un UUID v4.
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Longitud por defecto de la parte aleatoria.
pub const DEFAULT_ID_LEN: usize = 16;

/// Genera `len` caracteres hexadecimales aleatorios (máximo 32).
pub fn random_token(len: usize) -> String {
  let mut raw = Uuid::new_v4().simple().to_string();
  if len > raw.len() {
    raw.push_str(&Uuid::new_v4().simple().to_string());
  }
  raw.truncate(len);
  raw
}

/// Id con prefijo, por ejemplo `new_id("spec_", 12)` -> `spec_3f2a...`.
pub fn new_id(prefix: &str, len: usize) -> String {
  format!("{}{}", prefix, random_token(len))
}

/// Marca de tiempo RFC 3339 en UTC con microsegundos. El formato es de ancho
/// fijo, por lo que el orden lexicográfico coincide con el cronológico.
pub fn now_ts() -> String {
  format_ts(Utc::now())
}

pub fn format_ts(ts: DateTime<Utc>) -> String {
  ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parsea una marca de tiempo RFC 3339. Devuelve `None` si no es válida.
pub fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw).ok().map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_keep_prefix_and_length() {
    let id = new_id("spec_", 12);
    assert!(id.starts_with("spec_"));
    assert_eq!(id.len(), 5 + 12);
    assert_eq!(random_token(40).len(), 40);
  }

  #[test]
  fn timestamps_sort_lexicographically() {
    let a = now_ts();
    let b = now_ts();
    assert!(a <= b);
    assert!(parse_ts(&a).is_some());
    assert!(a.ends_with('Z'));
  }
}
