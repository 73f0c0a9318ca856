use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    retrievers::RetrieverError,
    schemas::{Document, Retriever},
    vectorstore::VectorStore,
};

/// Adapts a [`VectorStore`] to the [`Retriever`] interface, returning the
/// `num_docs` most similar documents.
pub struct VectorStoreRetriever<V: VectorStore> {
    vstore: Arc<V>,
    num_docs: usize,
    options: V::Options,
}

impl<V: VectorStore> VectorStoreRetriever<V> {
    pub fn new(vstore: Arc<V>, num_docs: usize, options: V::Options) -> Self {
        Self {
            vstore,
            num_docs,
            options,
        }
    }

    pub fn store(&self) -> &Arc<V> {
        &self.vstore
    }
}

#[async_trait]
impl<V: VectorStore> Retriever for VectorStoreRetriever<V> {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        Ok(self
            .vstore
            .similarity_search(query, self.num_docs, &self.options)
            .await?)
    }
}
