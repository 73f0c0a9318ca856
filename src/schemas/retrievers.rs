use std::sync::Arc;

use async_trait::async_trait;

use super::Document;
use crate::retrievers::RetrieverError;

/// Anything that can turn a free-text query into a ranked list of documents.
#[async_trait]
pub trait Retriever: Sync + Send {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError>;
}

#[async_trait]
impl<R> Retriever for Arc<R>
where
    R: Retriever + ?Sized,
{
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        (**self).get_relevant_documents(query).await
    }
}
