use crate::agent::{join_prompt, Agent};
use crate::agents::decode;
use crate::errors::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Eje amplio de clarificación propuesto por el agente A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadQuestion {
  #[serde(default)]
  pub id: Option<String>,
  pub axis: String,
  pub question: String,
  #[serde(default)]
  pub rationale: Option<String>,
}

#[derive(Deserialize)]
struct BroadQuestionsOutput {
  broad_questions: Vec<BroadQuestion>,
}

/// Agente A: de una idea difusa a 8-15 ejes de clarificación.
pub struct BroadQuestionsAgent {
  pub initial_description: String,
  pub kind: Option<String>,
}

impl Agent for BroadQuestionsAgent {
  type Output = Vec<BroadQuestion>;

  fn name(&self) -> &str {
    "A"
  }

  fn system_prompt(&self) -> String {
    join_prompt(&["You are Agent A in Promptly's Question Engine.",
                  "Goal: from a fuzzy project idea, propose 8–15 broad clarification axes.",
                  "Each axis should cover an important dimension such as user, platform, data, flows, constraints, \
                   risks.",
                  "Return JSON with a 'broad_questions' array.",
                  "Do not output anything except JSON."])
  }

  fn user_payload(&self) -> JsonValue {
    json!({ "initial_description": self.initial_description, "kind": self.kind })
  }

  fn input_blocks(&self) -> JsonValue {
    json!({ "agent": "A", "initial_description": self.initial_description, "kind": self.kind })
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    let out: BroadQuestionsOutput = decode(self.name(), raw)?;
    if out.broad_questions.len() < 3 {
      return Err(WorkflowError::invalid_output(self.name(), "broad_questions must contain at least 3 items"));
    }
    Ok(out.broad_questions
          .into_iter()
          .enumerate()
          .map(|(i, q)| BroadQuestion { id: Some(q.id.filter(|id| !id.is_empty()).unwrap_or_else(|| format!("axis_{}", i + 1))),
                                        axis: q.axis,
                                        question: q.question,
                                        rationale: Some(q.rationale.unwrap_or_default()) })
          .collect())
  }
}
