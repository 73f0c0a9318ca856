use serde::{Deserialize, Serialize};

/// A tool invocation requested by the model.
///
/// `arguments` is kept as the raw JSON string the provider returned; tools
/// parse it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new<I, N, A>(id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "system")]
    SystemMessage,
    #[serde(rename = "human")]
    HumanMessage,
    #[serde(rename = "ai")]
    AIMessage,
    #[serde(rename = "tool")]
    ToolMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_type<T: Into<String>>(content: T, message_type: MessageType) -> Self {
        Message {
            content: content.into(),
            message_type,
            id: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn new_system_message<T: Into<String>>(content: T) -> Self {
        Self::with_type(content, MessageType::SystemMessage)
    }

    pub fn new_human_message<T: Into<String>>(content: T) -> Self {
        Self::with_type(content, MessageType::HumanMessage)
    }

    pub fn new_ai_message<T: Into<String>>(content: T) -> Self {
        Self::with_type(content, MessageType::AIMessage)
    }

    /// Creates the message carrying a tool's output back to the model.
    pub fn new_tool_message<T: Into<String>, S: Into<String>>(content: T, tool_call_id: S) -> Self {
        let mut message = Self::with_type(content, MessageType::ToolMessage);
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_roundtrip_through_prompt_values() {
        let messages = vec![
            Message::new_ai_message("")
                .with_tool_calls(vec![ToolCall::new("call_1", "wikipedia", r#"{"query":"Rust"}"#)]),
            Message::new_tool_message("Page: Rust", "call_1"),
        ];

        let value = serde_json::to_value(&messages).unwrap();
        assert_eq!(value[0]["message_type"], "ai");
        assert_eq!(value[1]["tool_call_id"], "call_1");
        assert!(value[1].get("tool_calls").is_none());

        let back: Vec<Message> = serde_json::from_value(value).unwrap();
        assert_eq!(back, messages);
    }
}
