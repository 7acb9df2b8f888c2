//! promptly-workflow: agentes LLM y servicios de Promptly
//!
//! Define el trait `Agent` (prompt de sistema, payload y parser tipado), el
//! `AgentRunner` que registra cada llamada como un run, y los servicios que
//! orquestan el asistente de preguntas, las specs, los runs, el enhancer y
//! el generador de resultados sobre `DomainRepository`,
//! `WizardRepository` y `ChatProvider`.

pub mod agent;
pub mod agents;
pub mod config;
pub mod context;
pub mod errors;
pub mod services;

pub use agent::{Agent, AgentRunner, LoggedCall};
pub use config::WorkflowConfig;
pub use context::WorkflowContext;
pub use errors::WorkflowError;
pub use services::{EnhancerService, OutcomeService, RunService, SpecService, WizardService};
