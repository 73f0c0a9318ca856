use async_trait::async_trait;

use super::VectorStoreError;
use crate::schemas::Document;

#[async_trait]
pub trait VectorStore: Send + Sync {
    type Options: Send + Sync;

    /// Embeds and stores `docs`, returning their ids in order.
    async fn add_documents(
        &self,
        docs: &[Document],
        opt: &Self::Options,
    ) -> Result<Vec<String>, VectorStoreError>;

    /// Returns up to `limit` documents ordered by descending score.
    async fn similarity_search(
        &self,
        query: &str,
        limit: usize,
        opt: &Self::Options,
    ) -> Result<Vec<Document>, VectorStoreError>;
}
