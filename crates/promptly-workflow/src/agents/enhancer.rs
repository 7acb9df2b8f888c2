use crate::agent::{join_prompt, Agent};
use crate::agents::{check_range, decode};
use crate::errors::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Modos del enhancer de prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceMode {
  Structure,
  Style,
  Simplify,
  Validate,
  Score,
}

impl EnhanceMode {
  pub const ALL: [EnhanceMode; 5] =
    [EnhanceMode::Structure, EnhanceMode::Style, EnhanceMode::Simplify, EnhanceMode::Validate, EnhanceMode::Score];

  pub fn as_str(&self) -> &'static str {
    match self {
      EnhanceMode::Structure => "structure",
      EnhanceMode::Style => "style",
      EnhanceMode::Simplify => "simplify",
      EnhanceMode::Validate => "validate",
      EnhanceMode::Score => "score",
    }
  }

  fn system_lines(&self) -> &'static [&'static str] {
    match self {
      EnhanceMode::Structure => &["You are a world-class prompt engineer.",
                                  "Your job is to rewrite user prompts into a clear, structured format.",
                                  "Preserve the original intent, but make it easier for an LLM to follow.",
                                  "Return strictly JSON with keys: original, enhanced, notes."],
      EnhanceMode::Style => &["You are a world-class prompt editor.",
                              "Rewrite user prompts to be concise, explicit, and neutral in tone.",
                              "Do not change the task itself, only the wording and tone.",
                              "Return strictly JSON with keys: original, enhanced, notes."],
      EnhanceMode::Simplify => &["You simplify prompts while preserving intent.",
                                 "Remove redundancy, contradictions, and vague wording.",
                                 "Return strictly JSON with keys: original, enhanced, notes."],
      EnhanceMode::Validate => &["You are a prompt safety and quality validator.",
                                 "Read the user's prompt and identify potential issues:",
                                 "ambiguity, missing constraints, conflicting instructions, unsafe or disallowed \
                                  content.",
                                 "Return strictly JSON with keys: ok (boolean), issues (array)."],
      EnhanceMode::Score => &["You are a strict grader of prompt quality.",
                              "Score prompts from 0–10 on overall quality.",
                              "Higher score = clearer goal, better constraints, good structure, realistic expectations.",
                              "Also provide per-dimension scores if useful, e.g. clarity, structure, safety, \
                               specificity.",
                              "Return strictly JSON with keys: prompt, score, dimensions, suggestions."],
    }
  }
}

impl fmt::Display for EnhanceMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EnhanceMode {
  type Err = WorkflowError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    EnhanceMode::ALL.into_iter()
                    .find(|m| m.as_str() == s)
                    .ok_or_else(|| WorkflowError::Validation(format!("Unknown enhancer mode: {}", s)))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
  pub original: String,
  pub enhanced: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
  Info,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
  pub level: IssueLevel,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
  pub ok: bool,
  pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptScore {
  pub prompt: String,
  pub score: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dimensions: Option<BTreeMap<String, f64>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub suggestions: Option<Vec<String>>,
}

/// Resultado del enhancer según el modo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnhancerOutput {
  Enhanced(EnhancedPrompt),
  Validation(ValidationReport),
  Score(PromptScore),
}

/// Agente de mejora de prompts. No registra runs.
pub struct EnhancerAgent {
  pub mode: EnhanceMode,
  pub prompt: String,
}

impl EnhancerAgent {
  pub fn new(mode: EnhanceMode, prompt: &str) -> Self {
    Self { mode, prompt: prompt.to_string() }
  }
}

impl Agent for EnhancerAgent {
  type Output = EnhancerOutput;

  fn name(&self) -> &str {
    self.mode.as_str()
  }

  fn system_prompt(&self) -> String {
    join_prompt(self.mode.system_lines())
  }

  fn user_payload(&self) -> JsonValue {
    json!({ "prompt": self.prompt, "mode": self.mode })
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    match self.mode {
      EnhanceMode::Structure | EnhanceMode::Style | EnhanceMode::Simplify => {
        Ok(EnhancerOutput::Enhanced(decode(self.name(), raw)?))
      }
      EnhanceMode::Validate => Ok(EnhancerOutput::Validation(decode(self.name(), raw)?)),
      EnhanceMode::Score => {
        let score: PromptScore = decode(self.name(), raw)?;
        check_range(self.name(), "score", score.score, 0.0, 10.0)?;
        Ok(EnhancerOutput::Score(score))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mode_round_trips_through_str() {
    for mode in EnhanceMode::ALL {
      assert_eq!(mode.as_str().parse::<EnhanceMode>().unwrap(), mode);
    }
    assert!("shout".parse::<EnhanceMode>().is_err());
  }

  #[test]
  fn validate_rejects_unknown_level() {
    let agent = EnhancerAgent::new(EnhanceMode::Validate, "p");
    let raw = json!({ "ok": false, "issues": [{ "level": "fatal", "message": "x" }] });
    assert!(matches!(agent.parse(&raw), Err(WorkflowError::InvalidOutput { .. })));
  }
}
