use std::sync::Arc;

use async_trait::async_trait;

use super::EmbedderError;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError>;
    async fn embed_query(&self, text: &str) -> Result<Vec<f64>, EmbedderError>;

    /// Name of the embedding model; vectors from different models are not comparable.
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<E> Embedder for Arc<E>
where
    E: Embedder + ?Sized,
{
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        (**self).embed_documents(documents).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f64>, EmbedderError> {
        (**self).embed_query(text).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}
