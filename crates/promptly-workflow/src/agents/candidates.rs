use crate::agent::{join_prompt, Agent};
use crate::agents::decode;
use crate::errors::WorkflowError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCandidate {
  pub id: String,
  pub content: String,
}

#[derive(Deserialize)]
struct CandidatesOutput {
  candidates: Vec<GeneratedCandidate>,
}

/// Genera `n` variantes para una tarea. El parser recorta a `n`.
pub struct CandidateGenerator {
  pub task: String,
  pub input: Option<String>,
  pub style: Option<String>,
  pub constraints: Option<String>,
  pub n: u32,
  pub temperature: Option<f64>,
  pub max_tokens: Option<u32>,
}

impl Agent for CandidateGenerator {
  type Output = Vec<GeneratedCandidate>;

  fn name(&self) -> &str {
    "CANDIDATES"
  }

  fn system_prompt(&self) -> String {
    join_prompt(&["You are a careful generation engine for an AI assistant.",
                  "Given a task description and optional extra fields, you must generate N high-quality candidates.",
                  "Each candidate should be different but all must stay aligned with the task and constraints.",
                  "Return strictly JSON with a `candidates` array containing {id, content} objects.",
                  "Do NOT include any explanation outside JSON."])
  }

  fn user_payload(&self) -> JsonValue {
    json!({
      "task": self.task,
      "input": self.input,
      "style": self.style,
      "constraints": self.constraints,
      "n": self.n,
    })
  }

  fn temperature(&self) -> Option<f64> {
    self.temperature
  }

  fn max_tokens(&self) -> Option<u32> {
    self.max_tokens
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    let out: CandidatesOutput = decode(self.name(), raw)?;
    Ok(out.candidates.into_iter().take(self.n as usize).collect())
  }
}
