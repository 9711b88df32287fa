pub mod claude;
pub mod event_stream;
pub mod llm;
pub mod types;

pub use claude::ClaudeClient;
pub use event_stream::EventStream;
pub use llm::LLMClient;
pub use types::{Message, Role};
