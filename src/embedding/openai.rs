use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, Embedding},
    Client,
};
use async_trait::async_trait;

use super::{Embedder, EmbedderError};

pub const TEXT_EMBEDDING_ADA_002: &str = "text-embedding-ada-002";

/// Inputs sent per embeddings request. The API rejects batches above 2048.
const MAX_BATCH_SIZE: usize = 512;

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Default for OpenAiEmbedder {
    fn default() -> Self {
        Self::new(OpenAIConfig::default())
    }
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config),
            model: TEXT_EMBEDDING_ADA_002.to_string(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(batch.to_vec())
            .build()?;
        let response = self.client.embeddings().create(request).await?;

        let mut data: Vec<Embedding> = response.data;
        if data.len() != batch.len() {
            return Err(EmbedderError::CountMismatch {
                expected: batch.len(),
                actual: data.len(),
            });
        }
        data.sort_by_key(|e| e.index);
        Ok(data
            .into_iter()
            .map(|e| e.embedding.into_iter().map(f64::from).collect())
            .collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let mut embeddings = Vec::with_capacity(documents.len());
        for batch in documents.chunks(MAX_BATCH_SIZE) {
            log::debug!("Embedding batch of {} texts with {}", batch.len(), self.model);
            embeddings.extend(self.embed_batch(batch).await?);
        }
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f64>, EmbedderError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or(EmbedderError::EmptyEmbedding)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_embed_documents_orders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "object": "list",
                    "model": TEXT_EMBEDDING_ADA_002,
                    "data": [
                        {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                        {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
                    ],
                    "usage": {"prompt_tokens": 4, "total_tokens": 4}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let embedder = OpenAiEmbedder::new(
            OpenAIConfig::new()
                .with_api_key("test-key")
                .with_api_base(server.url()),
        );
        let vectors = embedder
            .embed_documents(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }
}
