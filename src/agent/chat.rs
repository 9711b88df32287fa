//! Request-validated chat entry points.
//!
//! Inputs arrive as JSON from an outer surface (an HTTP handler, the CLI).
//! They are checked here before anything reaches [`AgentService`].

use serde::{Deserialize, Serialize};

use crate::core::LLMError;
use crate::providers::claude::types::Usage;
use crate::providers::{EventStream, Message};

use super::AgentService;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChatInput {
    pub message: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ChatInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Parses and validates a JSON payload.
    pub fn parse(json: &str) -> Result<Self, LLMError> {
        let input: Self = serde_json::from_str(json)
            .map_err(|e| LLMError::Validation(format!("invalid chat input: {e}")))?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), LLMError> {
        require_message(&self.message)
    }
}

impl StreamChatInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Parses and validates a JSON payload.
    pub fn parse(json: &str) -> Result<Self, LLMError> {
        let input: Self = serde_json::from_str(json)
            .map_err(|e| LLMError::Validation(format!("invalid stream chat input: {e}")))?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), LLMError> {
        require_message(&self.message)
    }
}

fn require_message(message: &str) -> Result<(), LLMError> {
    if message.is_empty() {
        return Err(LLMError::Validation("message must not be empty".to_string()));
    }
    Ok(())
}

/// Continues a conversation with one new user message.
pub async fn chat_with_agent(service: &AgentService, input: ChatInput) -> Result<ChatReply, LLMError> {
    input.validate()?;

    let result = service
        .generate_from_history(&input.conversation_history, &input.message, None)
        .await?;

    Ok(ChatReply {
        message: result.text,
        usage: result.usage,
    })
}

/// Opens a streaming reply to a single message.
pub async fn stream_chat_with_agent(
    service: &AgentService,
    input: StreamChatInput,
) -> Result<EventStream, LLMError> {
    input.validate()?;

    service
        .stream_completion(&input.message, input.system_prompt.as_deref())
        .await
}
