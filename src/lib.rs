pub mod agent;
pub mod cli;
pub mod core;
pub mod eventsource;
pub mod providers;
pub mod tools;

pub use agent::{AgentService, CompletionResult};
pub use crate::core::{Config, LLMError, ServiceOptions};
pub use providers::{ClaudeClient, EventStream, LLMClient, Message, Role};
pub use tools::ToolDefinition;
