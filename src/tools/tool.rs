use async_trait::async_trait;
use serde_json::{json, Value};

use super::ToolError;

/// Keys a model may use to carry a single string argument.
const INPUT_KEYS: [&str; 3] = ["query", "input", "__arg1"];

#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name of the tool.
    fn name(&self) -> String;

    /// Provides a description of what the tool does and when to use it.
    fn description(&self) -> String;

    /// JSON schema of the arguments, offered to OpenAI-like function calling.
    ///
    /// Defaults to a single required `query` string:
    /// ```json
    /// {
    ///     "type": "object",
    ///     "properties": {
    ///         "query": { "type": "string", "description": "..." }
    ///     },
    ///     "required": ["query"]
    /// }
    /// ```
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": self.description()
                }
            },
            "required": ["query"]
        })
    }

    /// Parses the raw input with `parse_input` and runs the tool on it.
    /// This is the entry point the agent executor uses.
    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let input = self.parse_input(input).await;
        self.run(input).await
    }

    /// Executes the core functionality of the tool.
    async fn run(&self, input: Value) -> Result<String, ToolError>;

    /// Parses the input string, which could be a JSON value or a raw string, depending on the LLM model.
    ///
    /// A JSON object with one of `query`, `input` or `__arg1` as a string is
    /// reduced to that string; any other input is passed on verbatim.
    async fn parse_input(&self, input: &str) -> Value {
        match serde_json::from_str::<Value>(input) {
            Ok(Value::Object(map)) => INPUT_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(|s| Value::String(s.to_string()))
                .unwrap_or_else(|| Value::String(input.to_string())),
            Ok(Value::String(s)) => Value::String(s),
            _ => Value::String(input.to_string()),
        }
    }
}

/// Extracts the query string a single-input tool was called with.
pub(crate) fn query_from_input(input: &Value) -> Result<String, ToolError> {
    let query = match input {
        Value::String(s) => s.trim(),
        Value::Object(map) => INPUT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .ok_or_else(|| ToolError::MissingInput("query".to_string()))?
            .trim(),
        _ => {
            return Err(ToolError::InvalidInputError(
                "input must be a string".to_string(),
            ))
        }
    };
    if query.is_empty() {
        return Err(ToolError::MissingInput("query".to_string()));
    }
    Ok(query.to_string())
}
