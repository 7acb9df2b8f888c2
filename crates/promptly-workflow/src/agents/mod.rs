//! Agentes concretos: generación de preguntas (A, B), síntesis de la spec
//! (C), evaluador de prompts, juez de resultados, enhancer y generador de
//! candidatos.
mod broad_questions;
mod candidates;
mod choice_questions;
mod enhancer;
mod evaluator;
mod outcome_judge;
mod spec_synthesis;

pub use broad_questions::{BroadQuestion, BroadQuestionsAgent};
pub use candidates::{CandidateGenerator, GeneratedCandidate};
pub use choice_questions::ChoiceQuestionsAgent;
pub use enhancer::{EnhanceMode, EnhancedPrompt, EnhancerAgent, EnhancerOutput, IssueLevel, PromptScore, ValidationIssue,
                   ValidationReport};
pub use evaluator::EvaluatorAgent;
pub use outcome_judge::{JudgeMetric, JudgeVerdict, OutcomeJudgeAgent, OutcomeJudgement};
pub use spec_synthesis::{SpecSynthesis, SpecSynthesisAgent};

use crate::errors::WorkflowError;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Deserializa la respuesta del modelo en `T`, convirtiendo el error de serde
/// en `InvalidOutput`.
pub(crate) fn decode<T: DeserializeOwned>(agent: &str, raw: &JsonValue) -> Result<T, WorkflowError> {
  serde_json::from_value(raw.clone()).map_err(|e| WorkflowError::invalid_output(agent, e.to_string()))
}

pub(crate) fn check_range(agent: &str, field: &str, value: f64, min: f64, max: f64) -> Result<(), WorkflowError> {
  if value.is_finite() && value >= min && value <= max {
    Ok(())
  } else {
    Err(WorkflowError::invalid_output(agent, format!("{} must be between {} and {}, got {}", field, min, max, value)))
  }
}
