// repair.rs
use crate::classifier::ErrorType;
use crate::compiler::PromptBlock;
use crate::run::RunError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPlan {
  pub summary: String,
  pub suggested_changes: Vec<String>,
  pub new_prompt_blocks: Vec<PromptBlock>,
}

fn suggestions_for(kind: ErrorType) -> [&'static str; 2] {
  match kind {
    ErrorType::MissingFile => ["Check file paths and ensure all required files exist",
                               "Verify file permissions and accessibility"],
    ErrorType::RouteMismatch => ["Review API routes and endpoint configurations",
                                 "Ensure frontend and backend routes are in sync"],
    ErrorType::SchemaError => ["Validate data schema and field requirements",
                               "Check for missing or incorrectly formatted fields"],
    ErrorType::RuntimeException => ["Review stack trace and fix runtime errors",
                                    "Check for null/undefined values and type mismatches"],
    ErrorType::Unknown => ["Review error details and logs", "Consider adding more specific error handling"],
  }
}

/// Plan de reparación a partir de los errores registrados de un run. Los
/// bloques propuestos son los del último prompt compilado, si existe.
pub fn generate_repair_plan(compiled: Option<&[PromptBlock]>, errors: &[RunError]) -> RepairPlan {
  let summary = if errors.is_empty() {
    "No errors found for this run".to_string()
  } else {
    let joined = errors.iter()
                       .map(|e| {
                         let kind = if e.error_type.is_empty() { "unknown" } else { e.error_type.as_str() };
                         let details = if e.details.is_empty() { "No details" } else { e.details.as_str() };
                         format!("[{}] {}", kind, details)
                       })
                       .collect::<Vec<_>>()
                       .join("; ");
    format!("Found {} error(s): {}", errors.len(), joined)
  };

  let present: HashSet<&str> = errors.iter().map(|e| e.error_type.as_str()).collect();
  let mut suggested_changes = Vec::new();
  for kind in [ErrorType::MissingFile, ErrorType::RouteMismatch, ErrorType::SchemaError, ErrorType::RuntimeException] {
    if present.contains(kind.as_str()) {
      suggested_changes.extend(suggestions_for(kind).iter().map(|s| s.to_string()));
    }
  }
  if present.contains(ErrorType::Unknown.as_str()) || suggested_changes.is_empty() {
    suggested_changes.extend(suggestions_for(ErrorType::Unknown).iter().map(|s| s.to_string()));
  }

  RepairPlan { summary,
               suggested_changes,
               new_prompt_blocks: compiled.map(|b| b.to_vec()).unwrap_or_default() }
}
