use thiserror::Error;

use crate::text_splitter::TextSplitterError;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("{0}")]
    TextSplitterError(#[from] TextSplitterError),

    #[error("Failed to fetch {url}: {source}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} fetching {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error(transparent)]
    ReadabilityError(#[from] readability::error::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Error: {0}")]
    OtherError(String),
}
