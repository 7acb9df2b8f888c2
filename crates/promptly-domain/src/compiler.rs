// compiler.rs
//
// Compilador spec -> prompt. Recorre un conjunto fijo de campos del JSON de la
// spec y emite bloques `{role, label, content}` en orden estable. Es
// determinista salvo por el id `prompt_<millis>`.
use crate::spec::is_truthy;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const SYSTEM_ROLE_TEXT: &str = "You are an AI coding assistant. Follow the project spec strictly. Be deterministic, \
                                    avoid randomness, and always output complete, self-consistent code.";

pub const DEFAULT_PROJECT_GOAL: &str =
  "Build the project as defined in the spec in a deterministic, file-complete way.";

pub const OUTPUT_FORMAT_TEXT: &str = "Output code in a single response with clear file boundaries. For each file, start \
                                      with a comment line like: `// FILE: path/to/file.ext`.";

pub const VALIDATION_TEXT: &str = "Before you answer, mentally check that:\n- All required files are present\n- There are \
                                   no unresolved imports\n- The code is internally consistent\n- You did not invent \
                                   technologies or APIs absent from the spec";

pub const EXPLANATION_TEXT: &str = "Prompt blocks were compiled from the spec with a fixed ordering: system role, project \
                                    goal, actors, flows, requirements, data, constraints, evaluation, ui_ux, architecture, \
                                    tech stack, pages, data model, output rules, validation hints.";

/// Campos opcionales de la spec, en el orden en que se emiten.
const SECTIONS: [(&str, &str); 11] = [("actors", "Actors / Users"),
                                      ("flows", "Key User Flows"),
                                      ("requirements", "Functional Requirements"),
                                      ("data", "Data & Models"),
                                      ("constraints", "Constraints"),
                                      ("evaluation_criteria", "What 'Good' Looks Like"),
                                      ("ui_ux", "UI / UX Notes"),
                                      ("architecture", "Architecture"),
                                      ("tech_stack", "Tech Stack"),
                                      ("pages", "Pages & Routes"),
                                      ("data_model", "Data Model")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockRole {
  System,
  User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBlock {
  pub role: BlockRole,
  pub label: String,
  pub content: String,
}

impl PromptBlock {
  fn user(label: &str, content: String) -> Self {
    Self { role: BlockRole::User, label: label.to_string(), content }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledPrompt {
  pub id: String,
  pub blocks: Vec<PromptBlock>,
  pub explanation: String,
}

/// Prompt compilado tal como se persiste (`compiled_prompts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledPromptRecord {
  pub id: String,
  pub spec_id: String,
  pub blocks: Vec<PromptBlock>,
  pub explanation: Option<String>,
  pub created_at: String,
}

impl CompiledPromptRecord {
  pub fn from_compiled(spec_id: &str, compiled: &CompiledPrompt) -> Self {
    Self { id: crate::ids::new_id("cp_", 12),
           spec_id: spec_id.to_string(),
           blocks: compiled.blocks.clone(),
           explanation: Some(compiled.explanation.clone()),
           created_at: crate::ids::now_ts() }
  }
}

/// JSON con sangría de dos espacios; si falla, la representación plana.
fn as_json(value: &JsonValue) -> String {
  serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn field<'a>(spec: &'a JsonValue, key: &str) -> Option<&'a JsonValue> {
  spec.as_object().and_then(|o| o.get(key)).filter(|v| is_truthy(v))
}

fn project_goal(spec: &JsonValue) -> String {
  let goal = field(spec, "project_goal").or_else(|| field(spec, "objectives").and_then(|o| o.get("summary")).filter(|v| is_truthy(v)));
  match goal {
    Some(JsonValue::String(s)) => s.clone(),
    Some(other) => as_json(other),
    None => DEFAULT_PROJECT_GOAL.to_string(),
  }
}

pub fn compile_spec_to_prompt(spec: &JsonValue) -> CompiledPrompt {
  let mut blocks = Vec::with_capacity(SECTIONS.len() + 4);
  blocks.push(PromptBlock { role: BlockRole::System,
                            label: "System Role".to_string(),
                            content: SYSTEM_ROLE_TEXT.to_string() });
  blocks.push(PromptBlock::user("Project Goal", project_goal(spec)));

  for (key, label) in SECTIONS.iter() {
    if let Some(value) = field(spec, key) {
      blocks.push(PromptBlock::user(label, as_json(value)));
    }
  }

  blocks.push(PromptBlock::user("Output Format", OUTPUT_FORMAT_TEXT.to_string()));
  blocks.push(PromptBlock::user("Validation & Determinism", VALIDATION_TEXT.to_string()));

  CompiledPrompt { id: format!("prompt_{}", Utc::now().timestamp_millis()),
                   blocks,
                   explanation: EXPLANATION_TEXT.to_string() }
}
