use crate::core::LLMError;
use async_trait::async_trait;

use super::claude::types::{MessageResponse, MessagesRequest};
use super::EventStream;

/// Transport seam between the agent service and a completion provider.
///
/// Implementations send the request as given: one outbound call per
/// invocation, no retries, provider failures returned unchanged.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send a blocking request and return the provider's reply verbatim
    async fn create_message(
        &self,
        request: &MessagesRequest<'_>,
    ) -> Result<MessageResponse, LLMError>;

    /// Send a streaming request and return the open event stream
    async fn stream_message(&self, request: &MessagesRequest<'_>)
        -> Result<EventStream, LLMError>;
}
