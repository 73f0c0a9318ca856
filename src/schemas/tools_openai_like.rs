use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::Tool;

/// A tool described the way OpenAI-compatible APIs expect function tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl FunctionDefinition {
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        FunctionDefinition {
            name: name.trim().replace(' ', "_"),
            description: description.to_string(),
            parameters,
        }
    }

    pub fn from_langchain_tool(tool: &dyn Tool) -> FunctionDefinition {
        FunctionDefinition::new(&tool.name(), &tool.description(), tool.parameters())
    }
}
