use thiserror::Error;

use crate::{
    document_loaders::LoaderError, embedding::EmbedderError, text_splitter::TextSplitterError,
    vectorstore::VectorStoreError,
};

/// Errors specific to retrievers
#[derive(Error, Debug)]
pub enum RetrieverError {
    #[error("Wikipedia API error: {0}")]
    WikipediaError(String),

    #[error("arXiv API error: {0}")]
    ArxivError(String),

    #[error("Failed to load source document: {0}")]
    LoaderError(#[from] LoaderError),

    #[error("Failed to split source document: {0}")]
    TextSplitterError(#[from] TextSplitterError),

    #[error("Embedder error: {0}")]
    EmbedderError(#[from] EmbedderError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("Index build failed: {0}")]
    IndexBuildError(String),
}
