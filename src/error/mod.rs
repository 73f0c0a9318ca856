//! Top-level error type.
//!
//! Each module keeps its own `thiserror` enum; [`ChatbotError`] wraps all of
//! them so the application layer can propagate any failure with `?`.

pub use crate::agent::AgentError;
pub use crate::config::ConfigError;
pub use crate::document_loaders::LoaderError;
pub use crate::embedding::EmbedderError;
pub use crate::language_models::LLMError;
pub use crate::prompt::PromptError;
pub use crate::retrievers::RetrieverError;
pub use crate::text_splitter::TextSplitterError;
pub use crate::tools::ToolError;
pub use crate::vectorstore::VectorStoreError;

#[derive(thiserror::Error, Debug)]
pub enum ChatbotError {
    #[error("Agent error: {0}")]
    AgentError(#[from] AgentError),

    #[error("LLM error: {0}")]
    LLMError(#[from] LLMError),

    #[error("Prompt error: {0}")]
    PromptError(#[from] PromptError),

    #[error("Tool error: {0}")]
    ToolError(#[from] ToolError),

    #[error("Retriever error: {0}")]
    RetrieverError(#[from] RetrieverError),

    #[error("Loader error: {0}")]
    LoaderError(#[from] LoaderError),

    #[error("Text splitter error: {0}")]
    TextSplitterError(#[from] TextSplitterError),

    #[error("Embedder error: {0}")]
    EmbedderError(#[from] EmbedderError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Another question is still being answered")]
    Busy,

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChatbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_conversion() {
        let error: ChatbotError = AgentError::NoTools.into();
        match error {
            ChatbotError::AgentError(_) => {}
            _ => panic!("Expected AgentError variant"),
        }
    }

    #[test]
    fn test_tool_error_conversion() {
        let error: ChatbotError = ToolError::ExecutionError("test execution".to_string()).into();
        match error {
            ChatbotError::ToolError(_) => {}
            _ => panic!("Expected ToolError variant"),
        }
    }

    #[test]
    fn test_retriever_error_conversion() {
        let error: ChatbotError = RetrieverError::WikipediaError("test wikipedia".to_string()).into();
        match error {
            ChatbotError::RetrieverError(_) => {}
            _ => panic!("Expected RetrieverError variant"),
        }
    }

    #[test]
    fn test_busy_message() {
        assert_eq!(
            ChatbotError::Busy.to_string(),
            "Another question is still being answered"
        );
    }
}
