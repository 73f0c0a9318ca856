use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::TextSplitterError;
use crate::schemas::Document;

#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split_text(&self, text: &str) -> Result<Vec<String>, TextSplitterError>;

    /// Splits every document, copying its metadata onto each chunk.
    async fn split_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<Document>, TextSplitterError> {
        let (texts, metadatas): (Vec<_>, Vec<_>) = documents
            .iter()
            .map(|d| (d.page_content.clone(), d.metadata.clone()))
            .unzip();
        self.create_documents(&texts, &metadatas).await
    }

    async fn create_documents(
        &self,
        texts: &[String],
        metadatas: &[HashMap<String, Value>],
    ) -> Result<Vec<Document>, TextSplitterError> {
        let metadatas = if metadatas.is_empty() {
            vec![HashMap::new(); texts.len()]
        } else {
            metadatas.to_vec()
        };
        if texts.len() != metadatas.len() {
            return Err(TextSplitterError::MetadataTextMismatch);
        }

        let mut documents = Vec::new();
        for (text, metadata) in texts.iter().zip(metadatas) {
            for chunk in self.split_text(text).await? {
                documents.push(Document::new(chunk).with_metadata(metadata.clone()));
            }
        }
        Ok(documents)
    }
}
