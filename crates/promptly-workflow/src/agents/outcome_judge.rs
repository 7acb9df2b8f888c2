use crate::agent::{join_prompt, Agent};
use crate::agents::{check_range, decode};
use crate::errors::WorkflowError;
use promptly_domain::Run;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeVerdict {
  Pass,
  Fail,
  NeedsWork,
}

/// Métrica individual del juez. Los campos extra del modelo se conservan en
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeMetric {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub score: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub passed: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeJudgement {
  pub score: f64,
  pub verdict: JudgeVerdict,
  pub summary: String,
  #[serde(default)]
  pub metrics: Option<Vec<JudgeMetric>>,
  #[serde(default)]
  pub details: Option<JsonValue>,
  #[serde(flatten)]
  pub extra: Map<String, JsonValue>,
}

/// Juez de resultados: decide si la salida de un run cumple la spec.
pub struct OutcomeJudgeAgent {
  pub run: Run,
  pub spec: JsonValue,
  pub outcome_spec_id: String,
}

impl Agent for OutcomeJudgeAgent {
  type Output = OutcomeJudgement;

  fn name(&self) -> &str {
    "OUTCOME_JUDGE"
  }

  fn system_prompt(&self) -> String {
    join_prompt(&["You are the Outcome Judge agent in Promptly's outcome evaluation system.",
                  "Your goal: evaluate whether a run's output successfully meets the defined outcome criteria.",
                  "Consider:",
                  "- Correctness: Does the output match the expected behavior?",
                  "- Completeness: Are all required elements present?",
                  "- Quality: Is the output well-formed and useful?",
                  "- Compliance: Does it adhere to any constraints or requirements?",
                  "",
                  "Return JSON with:",
                  "- score (0-10): Overall outcome quality score",
                  "- verdict ('pass', 'fail', or 'needs_work'): Final judgment",
                  "- summary (string): Brief explanation of the outcome",
                  "- metrics (array, optional): Per-metric evaluations with name, score, passed, details",
                  "- details (any, optional): Additional context or data",
                  "",
                  "Do not output anything except JSON."])
  }

  fn user_payload(&self) -> JsonValue {
    json!({
      "run": {
        "id": self.run.id,
        "status": self.run.status,
        "model": self.run.model,
        "input": self.run.input_blocks,
        "output": self.run.raw_output,
      },
      "outcome_criteria": {
        "spec": self.spec,
        "requirements": "Evaluate if the output satisfies the spec requirements",
      },
    })
  }

  fn input_blocks(&self) -> JsonValue {
    json!({ "agent": "OUTCOME_JUDGE", "evaluated_run_id": self.run.id, "outcome_spec_id": self.outcome_spec_id })
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    let out: OutcomeJudgement = decode(self.name(), raw)?;
    check_range(self.name(), "score", out.score, 0.0, 10.0)?;
    for m in out.metrics.iter().flatten() {
      if let Some(score) = m.score {
        check_range(self.name(), &format!("metrics[{}].score", m.name), score, 0.0, 10.0)?;
      }
    }
    Ok(out)
  }
}
