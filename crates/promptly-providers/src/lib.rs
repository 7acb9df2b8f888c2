mod config;
mod errors;
mod openai;
mod provider;
mod stubs;

pub use config::{new_from_env, ProviderConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use errors::ProviderError;
pub use openai::OpenAiProvider;
pub use provider::{ChatProvider, ChatRequest, DEFAULT_MODEL};
pub use stubs::{DisabledProvider, ScriptedProvider};
