use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextSplitterError {
    #[error("Mismatch metadata and text")]
    MetadataTextMismatch,

    #[error("Invalid chunk overlap and size: overlap {chunk_overlap} is larger than size {chunk_size}")]
    InvalidSplitterOptions {
        chunk_size: usize,
        chunk_overlap: usize,
    },

    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
}
