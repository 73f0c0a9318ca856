use serde::{Deserialize, Serialize};

use crate::schemas::ToolCall;

pub mod llm;
pub mod options;

mod error;
pub use error::*;

/// What a chat model returned for one request.
///
/// A response either carries text in `generation`, tool calls in
/// `tool_calls`, or both.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GenerateResult {
    pub tokens: Option<TokenUsage>,
    pub generation: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl GenerateResult {
    pub fn text<S: Into<String>>(generation: S) -> Self {
        GenerateResult {
            generation: generation.into(),
            ..Default::default()
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        GenerateResult {
            tool_calls,
            ..Default::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(10, 5).total_tokens, 15);
    }

    #[test]
    fn test_generate_result_tool_calls() {
        assert!(!GenerateResult::text("hello").has_tool_calls());
        let result =
            GenerateResult::with_tool_calls(vec![ToolCall::new("call_0", "wikipedia", "{}")]);
        assert!(result.has_tool_calls());
        assert!(result.generation.is_empty());
    }
}
