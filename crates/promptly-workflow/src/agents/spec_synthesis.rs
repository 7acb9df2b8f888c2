use crate::agent::{join_prompt, Agent};
use crate::agents::decode;
use crate::errors::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

/// Salida del agente C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSynthesis {
  #[serde(default)]
  pub intent: Option<Map<String, JsonValue>>,
  pub spec: Map<String, JsonValue>,
  pub explanation: String,
}

/// Agente C: construye la spec estructurada a partir de las respuestas.
pub struct SpecSynthesisAgent {
  pub initial_description: String,
  pub kind: Option<String>,
  pub qa_pairs: Vec<JsonValue>,
}

impl Agent for SpecSynthesisAgent {
  type Output = SpecSynthesis;

  fn name(&self) -> &str {
    "C"
  }

  fn system_prompt(&self) -> String {
    join_prompt(&["You are Agent C in Promptly's Question Engine.",
                  "You receive all questions and answers from a wizard.",
                  "You must build a structured high-level Spec JSON with keys such as:",
                  "project_goal, objectives, actors, flows, requirements, constraints, data, evaluation_criteria, ui_ux.",
                  "Return JSON with keys: intent (optional), spec, explanation.",
                  "Do not output anything except JSON."])
  }

  fn user_payload(&self) -> JsonValue {
    json!({ "initial_description": self.initial_description, "kind": self.kind, "qa_pairs": self.qa_pairs })
  }

  fn input_blocks(&self) -> JsonValue {
    json!({
      "agent": "C",
      "initial_description": self.initial_description,
      "kind": self.kind,
      "qa_pairs": self.qa_pairs,
    })
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    decode(self.name(), raw)
  }
}
