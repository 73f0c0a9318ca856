use thiserror::Error;

use crate::retrievers::RetrieverError;

/// Errors raised while executing a tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Execution failed: {0}")]
    ExecutionError(String),

    #[error("Invalid input: {0}")]
    InvalidInputError(String),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error(transparent)]
    RetrieverError(#[from] RetrieverError),
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        ToolError::ExecutionError(s)
    }
}
