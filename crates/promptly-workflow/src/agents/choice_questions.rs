use crate::agent::{join_prompt, Agent};
use crate::agents::{decode, BroadQuestion};
use crate::errors::WorkflowError;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use wizard::QuestionDraft;

#[derive(Deserialize)]
struct ChoiceQuestionsOutput {
  choice_questions: Vec<QuestionDraft>,
}

/// Agente B: convierte los ejes del agente A en preguntas concretas. Los ids
/// que proponga el modelo se descartan; el asistente asigna los suyos.
pub struct ChoiceQuestionsAgent {
  pub initial_description: String,
  pub kind: Option<String>,
  pub broad_questions: Vec<BroadQuestion>,
}

impl Agent for ChoiceQuestionsAgent {
  type Output = Vec<QuestionDraft>;

  fn name(&self) -> &str {
    "B"
  }

  fn system_prompt(&self) -> String {
    join_prompt(&["You are Agent B in Promptly's Question Engine.",
                  "Goal: convert Agent A's broad axes into concrete, user-friendly questions.",
                  "Use types: 'single_choice', 'multi_choice', 'yes_no', 'short_text'.",
                  "Each choice question may have an 'options' array for choice types.",
                  "Return JSON with a 'choice_questions' array.",
                  "Do not output anything except JSON."])
  }

  fn user_payload(&self) -> JsonValue {
    json!({
      "initial_description": self.initial_description,
      "kind": self.kind,
      "broad_questions": self.broad_questions,
    })
  }

  fn input_blocks(&self) -> JsonValue {
    json!({
      "agent": "B",
      "initial_description": self.initial_description,
      "kind": self.kind,
      "broad_questions": self.broad_questions,
    })
  }

  fn parse(&self, raw: &JsonValue) -> Result<Self::Output, WorkflowError> {
    let out: ChoiceQuestionsOutput = decode(self.name(), raw)?;
    if out.choice_questions.len() < 3 {
      return Err(WorkflowError::invalid_output(self.name(), "choice_questions must contain at least 3 items"));
    }
    Ok(out.choice_questions)
  }
}
