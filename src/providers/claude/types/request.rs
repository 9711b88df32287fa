use super::Message;
use crate::tools::ToolDefinition;
use serde::Serialize;
use serde_json::Value;

/// Body of a `POST /messages` call.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct Tool<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub input_schema: &'a Value,
}

impl<'a> From<&'a ToolDefinition> for Tool<'a> {
    fn from(tool_definition: &'a ToolDefinition) -> Self {
        Self {
            name: &tool_definition.name,
            description: tool_definition.description.as_deref(),
            input_schema: &tool_definition.input_schema,
        }
    }
}

impl<'a> MessagesRequest<'a> {
    pub const fn new(model: &'a str, max_tokens: u32, messages: Vec<Message<'a>>) -> Self {
        Self {
            model,
            max_tokens,
            system: None,
            messages,
            tools: None,
            stream: None,
        }
    }

    pub const fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    pub const fn with_system(mut self, system: Option<&'a str>) -> Self {
        self.system = system;
        self
    }

    pub fn with_tools(mut self, tools: &'a [ToolDefinition]) -> Self {
        self.tools = Some(tools.iter().map(Tool::from).collect());
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}
