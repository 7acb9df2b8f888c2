use crate::agent::{join_prompt, Agent};
use crate::agents::{check_range, decode};
use crate::errors::WorkflowError;
use promptly_domain::{EvaluationDraft, PromptBlock};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

#[derive(Deserialize)]
struct EvaluatorOutput {
  score: f64,
  verdict: String,
  summary: String,
  #[serde(default)]
  issues: Option<Vec<JsonValue>>,
  #[serde(default)]
  suggestions: Option<Vec<JsonValue>>,
  #[serde(default)]
  strengths: Option<Vec<String>>,
  #[serde(default)]
  weaknesses: Option<Vec<String>>,
}

/// Evalúa un prompt compilado frente a la spec de la que salió. Nota 0-100.
pub struct EvaluatorAgent {
  pub spec: JsonValue,
  pub blocks: Vec<PromptBlock>,
}

impl Agent for EvaluatorAgent {
  type Output = EvaluationDraft;

  fn name(&self) -> &str {
    "EVALUATOR"
  }

  fn system_prompt(&self) -> String {
    join_prompt(&["You are the Evaluator agent in Promptly's prompt evaluation system.",
                  "Your goal: analyze a compiled prompt against its original spec to assess quality, completeness, \
                   and correctness.",
                  "Consider:",
                  "- Completeness: Does the prompt cover all requirements from the spec?",
                  "- Clarity: Are instructions clear and unambiguous?",
                  "- Structure: Is the prompt well-organized and logical?",
                  "- Determinism: Does the prompt guide toward deterministic outputs?",
                  "- Missing elements: Are there gaps or omissions?",
                  "- Potential issues: Could this prompt lead to errors or misinterpretation?",
                  "",
                  "Return JSON with:",
                  "- score (0-100): Overall quality score",
                  "- verdict ('pass', 'fail', or 'needs_work'): Overall assessment",
                  "- summary (string): Brief evaluation summary",
                  "- issues (array, optional): List of problems found, each with category, severity, description",
                  "- suggestions (array, optional): List of improvement recommendations",
                  "- strengths (array, optional): What the prompt does well",
                  "- weaknesses (array, optional): What could be improved",
                  "",
                  "Do not output anything except JSON."])
  }

  fn user_payload(&self) -> JsonValue {
    json!({
      "spec": self.spec,
      "compiled_prompt_blocks": self.blocks,
      "evaluation_criteria": {
        "completeness": "All spec requirements covered",
        "clarity": "Instructions are clear and unambiguous",
        "structure": "Well-organized and logical flow",
        "determinism": "Guides toward consistent outputs",
        "error_prevention": "Minimizes potential errors",
      },
    })
  }

  fn input_blocks(&self) -> JsonValue {
    let title = self.spec.get("title").and_then(JsonValue::as_str).filter(|t| !t.is_empty()).unwrap_or("Untitled");
    json!({ "agent": "EVALUATOR", "spec_title": title, "prompt_blocks_count": self.blocks.len() })
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    let out: EvaluatorOutput = decode(self.name(), raw)?;
    check_range(self.name(), "score", out.score, 0.0, 100.0)?;
    let details = json!({
      "issues": out.issues.unwrap_or_default(),
      "suggestions": out.suggestions.unwrap_or_default(),
      "strengths": out.strengths.unwrap_or_default(),
      "weaknesses": out.weaknesses.unwrap_or_default(),
    });
    Ok(EvaluationDraft { score: out.score, verdict: out.verdict, summary: out.summary, details })
  }
}
