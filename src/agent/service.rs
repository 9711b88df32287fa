use log::debug;

use crate::core::{Config, LLMError, ServiceOptions};
use crate::providers::claude::types::{Message as WireMessage, MessageResponse, MessagesRequest};
use crate::providers::{ClaudeClient, EventStream, LLMClient, Message};
use crate::tools::ToolDefinition;

use super::normalize::{extract, CompletionResult};

/// Output token budget for plain and streaming generation.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Output token budget when tool definitions are attached.
pub const TOOL_MAX_TOKENS: u32 = 4096;

/// Builds completion requests and dispatches them to a provider.
///
/// Every call is independent: one outbound request, no retries, provider
/// errors returned unchanged.
pub struct AgentService {
    client: Box<dyn LLMClient>,
    model: String,
}

impl AgentService {
    /// Creates a service talking to the Anthropic API with its own credentials.
    pub fn new(options: ServiceOptions, config: Config) -> Self {
        let model = config.model.clone();
        Self {
            client: Box::new(ClaudeClient::new(options, config)),
            model,
        }
    }

    /// Loads `config.toml` and reads the API key from the environment.
    pub fn from_env() -> Result<Self, LLMError> {
        let config = Config::load()?;
        let options = ServiceOptions::from_env()?;
        Ok(Self::new(options, config))
    }

    /// Creates a service on top of any provider implementation.
    pub fn with_client(client: impl LLMClient + 'static, model: impl Into<String>) -> Self {
        Self {
            client: Box::new(client),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user message and normalizes the reply.
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<CompletionResult, LLMError> {
        validate_prompt(prompt)?;

        let request = self
            .request(vec![WireMessage::user(prompt)], DEFAULT_MAX_TOKENS)
            .with_system(system_prompt);

        let response = self.client.create_message(&request).await?;
        Ok(extract(&response))
    }

    /// Sends `history` followed by `prompt` as the newest user turn.
    pub async fn generate_from_history(
        &self,
        history: &[Message],
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<CompletionResult, LLMError> {
        validate_prompt(prompt)?;

        let mut messages: Vec<WireMessage> = Vec::with_capacity(history.len() + 1);
        messages.extend(history.iter().map(WireMessage::from));
        messages.push(WireMessage::user(prompt));

        let request = self
            .request(messages, DEFAULT_MAX_TOKENS)
            .with_system(system_prompt);

        let response = self.client.create_message(&request).await?;
        Ok(extract(&response))
    }

    /// Sends `prompt` with tool definitions attached.
    ///
    /// The reply is returned unmodified since tool calls do not fit the
    /// plain-text result shape.
    pub async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
        system_prompt: Option<&str>,
    ) -> Result<MessageResponse, LLMError> {
        validate_prompt(prompt)?;

        let request = self
            .request(vec![WireMessage::user(prompt)], TOOL_MAX_TOKENS)
            .with_system(system_prompt)
            .with_tools(tools);

        self.client.create_message(&request).await
    }

    /// Opens a streaming completion for `prompt`.
    ///
    /// Events are passed through as the provider sends them. The caller
    /// either drains the stream or cancels/drops it to close the connection.
    pub async fn stream_completion(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<EventStream, LLMError> {
        validate_prompt(prompt)?;

        let request = self
            .request(vec![WireMessage::user(prompt)], DEFAULT_MAX_TOKENS)
            .with_system(system_prompt)
            .with_stream(true);

        self.client.stream_message(&request).await
    }

    fn request<'a>(&'a self, messages: Vec<WireMessage<'a>>, max_tokens: u32) -> MessagesRequest<'a> {
        debug!(
            "[AgentService] building request: model={} max_tokens={max_tokens} messages={}",
            self.model,
            messages.len()
        );
        MessagesRequest::new(&self.model, max_tokens, messages)
    }
}

fn validate_prompt(prompt: &str) -> Result<(), LLMError> {
    if prompt.is_empty() {
        return Err(LLMError::Validation("prompt must not be empty".to_string()));
    }
    Ok(())
}
