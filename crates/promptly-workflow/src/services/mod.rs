mod enhancer_service;
mod outcome_service;
mod run_service;
mod spec_service;
mod wizard_service;

pub use enhancer_service::EnhancerService;
pub use outcome_service::{GenerationMeta, OutcomeGeneration, OutcomeRequest, OutcomeService, DEFAULT_CANDIDATES,
                          MIN_CANDIDATES};
pub use run_service::{MetricSummary, OutcomeCheck, OutcomeRunSummary, RunService, DEFAULT_DETECTED_BY,
                      OUTCOME_TASK_FALLBACK};
pub use spec_service::{CompiledSpec, SpecService};
pub use wizard_service::{AnswerControl, AnswerOutcome, FinalizedSession, RegeneratedQuestion, StartedSession,
                         WizardService, MAX_KIND_LEN};
