//! Prompt/response adaptation layer.
//!
//! [`AgentService`] turns a prompt into a Messages API request and
//! [`normalize::extract`] maps the blocking reply onto [`CompletionResult`].
//! The [`chat`] functions sit on top and validate caller input first.

pub mod chat;
pub mod normalize;
mod service;

pub use chat::{chat_with_agent, stream_chat_with_agent, ChatInput, ChatReply, StreamChatInput};
pub use normalize::{extract, CompletionResult};
pub use service::{AgentService, DEFAULT_MAX_TOKENS, TOOL_MAX_TOKENS};
