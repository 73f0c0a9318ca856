use async_trait::async_trait;

use super::{Embedder, EmbedderError};

/// Deterministic embedder for tests and offline runs.
///
/// Each text maps to its normalised a-z letter histogram, so texts sharing
/// vocabulary land close together under cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct MockEmbedder;

impl MockEmbedder {
    pub fn new() -> Self {
        MockEmbedder
    }

    fn embed(text: &str) -> Vec<f64> {
        let mut histogram = vec![0.0; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            let idx = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            histogram[idx] += 1.0;
        }
        let norm = histogram.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            histogram.iter_mut().for_each(|x| *x /= norm);
        }
        histogram
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        Ok(documents.iter().map(|d| Self::embed(d)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f64>, EmbedderError> {
        Ok(Self::embed(text))
    }

    fn model_id(&self) -> &str {
        "mock-letter-histogram"
    }
}
