use serde::Serialize;

use crate::providers::claude::types::{ContentBlock, MessageResponse, StopReason, Usage};

/// Stable shape of a blocking completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub text: String,
    pub usage: Usage,
    pub stop_reason: Option<StopReason>,
}

/// Reduces a raw reply to its first content block's text.
///
/// Only the leading block is inspected. When it is not a text block (a tool
/// call, a thinking block) or the reply has no content, `text` is empty; this
/// is not an error. Callers that need tool calls use
/// [`AgentService::generate_with_tools`](super::AgentService::generate_with_tools),
/// which skips normalization.
pub fn extract(raw: &MessageResponse) -> CompletionResult {
    let text = match raw.content.first() {
        Some(ContentBlock::Text { text, .. }) => text.clone(),
        _ => String::new(),
    };

    CompletionResult {
        text,
        usage: raw.usage.clone(),
        stop_reason: raw.stop_reason.clone(),
    }
}

impl From<&MessageResponse> for CompletionResult {
    fn from(raw: &MessageResponse) -> Self {
        extract(raw)
    }
}
