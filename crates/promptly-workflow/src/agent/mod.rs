mod runner;
mod trait_agent;

pub use runner::{AgentRunner, LoggedCall};
pub use trait_agent::{join_prompt, Agent};
