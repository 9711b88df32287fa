use crate::core::{Config, LLMError, ServiceOptions};
use crate::eventsource::{Event, EventSourceExt};
use crate::providers::llm::LLMClient;
use crate::providers::EventStream;
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};

use super::types::{MessageResponse, MessagesRequest, StreamEvent};

/// Client for the Anthropic Messages API
pub struct ClaudeClient {
    options: ServiceOptions,
    client: Client,
    config: Config,
}

impl ClaudeClient {
    /// Create a new Claude client owning the given credentials
    pub fn new(options: ServiceOptions, config: Config) -> Self {
        Self {
            options,
            client: Client::new(),
            config,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Build headers for API requests
    fn build_headers(&self, stream: bool) -> Result<HeaderMap, LLMError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.options.api_key)
                .map_err(|_| LLMError::ConfigError("API key is not a valid header value".into()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(&self.config.api_version).map_err(|_| {
                LLMError::ConfigError(format!("invalid api_version: {}", self.config.api_version))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if stream {
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        }
        Ok(headers)
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<reqwest::Response, LLMError> {
        let headers = self.build_headers(request.is_streaming())?;

        debug!(
            "[Claude] POST {} model={} max_tokens={} messages={} stream={}",
            self.config.messages_url(),
            request.model,
            request.max_tokens,
            request.messages.len(),
            request.is_streaming()
        );

        let response = self
            .client
            .post(self.config.messages_url())
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!("[Claude] request failed with status {status}");
        Err(LLMError::from_status(status, &error_text))
    }
}

impl TryFrom<Event> for StreamEvent {
    type Error = LLMError;

    fn try_from(event: Event) -> Result<Self, LLMError> {
        serde_json::from_str(&event.data).map_err(|e| {
            LLMError::StreamError(format!(
                "Failed to parse Claude stream event: {event}. Error: {e}"
            ))
        })
    }
}

#[async_trait]
impl LLMClient for ClaudeClient {
    async fn create_message(
        &self,
        request: &MessagesRequest<'_>,
    ) -> Result<MessageResponse, LLMError> {
        let response = self.send(request).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            LLMError::ResponseFormat(format!("Failed to parse Claude response: {e}"))
        })
    }

    async fn stream_message(
        &self,
        request: &MessagesRequest<'_>,
    ) -> Result<EventStream, LLMError> {
        let response = self.send(request).await?;

        let events = response.bytes_stream().events().map(|event| {
            event
                .map_err(|e| LLMError::StreamError(e.to_string()))
                .and_then(StreamEvent::try_from)
        });

        Ok(EventStream::new(events))
    }
}
