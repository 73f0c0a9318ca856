use std::io;

use thiserror::Error;

use crate::embedding::EmbedderError;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Embedder error: {0}")]
    EmbedderError(#[from] EmbedderError),

    #[error("Store file error: {0}")]
    IOError(#[from] io::Error),

    #[error("Store serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Error: {0}")]
    OtherError(String),
}

impl From<String> for VectorStoreError {
    fn from(value: String) -> Self {
        Self::OtherError(value)
    }
}

impl From<&str> for VectorStoreError {
    fn from(value: &str) -> Self {
        Self::OtherError(value.to_string())
    }
}
