use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{query_from_input, Tool, ToolError};
use crate::schemas::Retriever;

/// A tool that wraps a Retriever, letting the agent search it on demand.
///
/// The observation is the content of every retrieved document, separated by
/// blank lines.
pub struct RetrieverTool {
    retriever: Arc<dyn Retriever>,
    name: String,
    description: String,
}

impl RetrieverTool {
    pub fn new<S: Into<String>>(retriever: Arc<dyn Retriever>, name: S, description: S) -> Self {
        Self {
            retriever,
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }
}

/// Builds a [`RetrieverTool`] named `name`.
pub fn create_retriever_tool(
    retriever: Arc<dyn Retriever>,
    name: &str,
    description: &str,
) -> RetrieverTool {
    RetrieverTool::new(retriever, name, description)
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "query to look up in retriever"
                }
            },
            "required": ["query"]
        })
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = query_from_input(&input)?;
        let documents = self.retriever.get_relevant_documents(&query).await?;
        log::debug!("{} retrieved {} documents", self.name, documents.len());

        Ok(documents
            .iter()
            .map(|doc| doc.page_content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
