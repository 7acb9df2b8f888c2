mod classifier;
mod compiler;
mod doc;
mod domain_repository;
mod domain_stubs;
mod errors;
mod evaluation;
pub mod ids;
mod optimize;
mod outcome;
mod repair;
mod run;
mod spec;
mod user;

pub use classifier::{classify_error, Classification, ErrorType};
pub use compiler::{compile_spec_to_prompt, BlockRole, CompiledPrompt, CompiledPromptRecord, PromptBlock};
pub use doc::{merge_content, Doc, DocUpdate, Share, ShareMode};
pub use domain_repository::{DomainRepository, InMemoryDomainRepository};
pub use domain_stubs::DomainStubs;
pub use errors::DomainError;
pub use evaluation::{Evaluation, EvaluationDraft};
pub use optimize::{simulate_optimization, OptimizationReport};
pub use outcome::{apply_tests, final_score, pick_best, OutcomeCandidate, OutcomeRun, OutcomeTests, ScoredCandidate,
                  TestReport, SCORING_VERSION};
pub use repair::{generate_repair_plan, RepairPlan};
pub use run::{parse_run_limit, NewRun, Run, RunError, RunFilter, RunStatus, DEFAULT_RUN_LIMIT, MAX_RUN_LIMIT};
pub use spec::{is_truthy, parse_limit, parse_offset, DataModelEntity, PageInput, Spec, SpecFilter, SpecInput, SpecStatus,
               TechStack, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, WIZARD_SPEC_TITLE};
pub use user::{normalize_email, User, DEMO_USER_EMAIL, DEMO_USER_ID};
