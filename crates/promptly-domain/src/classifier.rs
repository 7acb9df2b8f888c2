// classifier.rs
//
// Clasificación de errores por palabras clave. Se evalúan las categorías en
// orden y gana la primera que coincida.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
  MissingFile,
  RouteMismatch,
  SchemaError,
  RuntimeException,
  Unknown,
}

impl ErrorType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorType::MissingFile => "missing_file",
      ErrorType::RouteMismatch => "route_mismatch",
      ErrorType::SchemaError => "schema_error",
      ErrorType::RuntimeException => "runtime_exception",
      ErrorType::Unknown => "unknown",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      ErrorType::MissingFile => "File or resource not found",
      ErrorType::RouteMismatch => "Route or endpoint mismatch",
      ErrorType::SchemaError => "Schema validation or data format error",
      ErrorType::RuntimeException => "Runtime exception occurred",
      ErrorType::Unknown => "Unclassified error",
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "missing_file" => Some(ErrorType::MissingFile),
      "route_mismatch" => Some(ErrorType::RouteMismatch),
      "schema_error" => Some(ErrorType::SchemaError),
      "runtime_exception" => Some(ErrorType::RuntimeException),
      "unknown" => Some(ErrorType::Unknown),
      _ => None,
    }
  }
}

impl fmt::Display for ErrorType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  pub error_type: ErrorType,
  pub details: String,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|n| haystack.contains(n))
}

pub fn classify_error(raw_output: &str, feedback: &str) -> Classification {
  let combined = format!("{} {}", raw_output, feedback).to_lowercase();

  let error_type = if contains_any(&combined, &["no such file", "file not found", "enoent", "cannot find file"]) {
    ErrorType::MissingFile
  } else if contains_any(&combined, &["404", "route", "endpoint not found", "cannot get", "cannot post"]) {
    ErrorType::RouteMismatch
  } else if contains_any(&combined, &["schema", "validation", "invalid", "expected", "required field"]) {
    ErrorType::SchemaError
  } else if contains_any(&combined, &["error:", "exception", "stack trace", "typeerror", "referenceerror"])
            || (combined.contains("at ") && combined.contains(".js:"))
  {
    ErrorType::RuntimeException
  } else {
    ErrorType::Unknown
  };

  Classification { error_type, details: error_type.description().to_string() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_matching_category_wins() {
    // "ENOENT" y "Error:" aparecen juntos: gana missing_file.
    let c = classify_error("Error: ENOENT: no such file", "");
    assert_eq!(c.error_type, ErrorType::MissingFile);
    assert_eq!(classify_error("", "Cannot GET /api/x").error_type, ErrorType::RouteMismatch);
    assert_eq!(classify_error("invalid payload", "").error_type, ErrorType::SchemaError);
    assert_eq!(classify_error("    at main (/srv/app.js:10:3)", "").error_type, ErrorType::RuntimeException);
    assert_eq!(classify_error("all good", "meh").error_type, ErrorType::Unknown);
  }
}
