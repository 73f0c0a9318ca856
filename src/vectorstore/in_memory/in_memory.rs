use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    embedding::Embedder,
    schemas::Document,
    utils::cosine_similarity_f64,
    vectorstore::{VecStoreOptions, VectorStore, VectorStoreError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: String,
    document: Document,
    embedding: Vec<f64>,
}

#[derive(Serialize)]
struct SnapshotRef<'a, M> {
    meta: &'a M,
    entries: &'a [Entry],
}

#[derive(Deserialize)]
struct Snapshot<M> {
    meta: M,
    entries: Vec<Entry>,
}

/// Vector store held in process memory, persisted to a JSON file on request.
pub struct Store {
    data: RwLock<Vec<Entry>>,
    embedder: Arc<dyn Embedder>,
    next_id: AtomicU64,
}

pub struct StoreBuilder {
    embedder: Option<Arc<dyn Embedder>>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder { embedder: None }
    }

    pub fn embedder<E: Embedder + 'static>(mut self, embedder: E) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }

    pub fn shared_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn build(self) -> Result<Store, VectorStoreError> {
        let embedder = self.embedder.ok_or("embedder is required".to_string())?;
        Ok(Store::with_entries(embedder, Vec::new()))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn metadata_matches(
    doc_metadata: &HashMap<String, Value>,
    filter: &serde_json::Map<String, Value>,
) -> bool {
    filter
        .iter()
        .all(|(k, v)| doc_metadata.get(k).is_some_and(|dv| dv == v))
}

impl Store {
    fn with_entries(embedder: Arc<dyn Embedder>, entries: Vec<Entry>) -> Self {
        let next_id = AtomicU64::new(entries.len() as u64);
        Store {
            data: RwLock::new(entries),
            embedder,
            next_id,
        }
    }

    fn next_id(&self) -> String {
        format!("inmem-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes every entry, embeddings included, as JSON alongside `meta`,
    /// which describes how the entries were produced.
    pub fn save<P: AsRef<Path>, M: Serialize>(&self, path: P, meta: &M) -> Result<(), VectorStoreError> {
        let json = {
            let data = self.data.read().map_err(|e| e.to_string())?;
            serde_json::to_vec(&SnapshotRef {
                meta,
                entries: data.as_slice(),
            })?
        };
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Restores a store written by [`Store::save`] together with its `meta`.
    /// Queries are embedded with `embedder`; callers check `meta` to make sure
    /// it is the model the file was built with.
    pub fn load<P: AsRef<Path>, M: DeserializeOwned>(
        path: P,
        embedder: Arc<dyn Embedder>,
    ) -> Result<(M, Store), VectorStoreError> {
        let bytes = std::fs::read(path)?;
        let snapshot: Snapshot<M> = serde_json::from_slice(&bytes)?;
        Ok((
            snapshot.meta,
            Store::with_entries(embedder, snapshot.entries),
        ))
    }
}

#[async_trait]
impl VectorStore for Store {
    type Options = VecStoreOptions;

    async fn add_documents(
        &self,
        docs: &[Document],
        _opt: &VecStoreOptions,
    ) -> Result<Vec<String>, VectorStoreError> {
        let texts: Vec<String> = docs.iter().map(|d| d.page_content.clone()).collect();
        let vectors = self.embedder.embed_documents(&texts).await?;
        if vectors.len() != docs.len() {
            return Err("Number of vectors and documents do not match".into());
        }
        let mut data = self.data.write().map_err(|e| e.to_string())?;
        let mut ids = Vec::with_capacity(docs.len());
        for (doc, embedding) in docs.iter().zip(vectors) {
            let id = self.next_id();
            ids.push(id.clone());
            let mut document = doc.clone();
            document.score = 0.0;
            data.push(Entry {
                id,
                document,
                embedding,
            });
        }
        Ok(ids)
    }

    async fn similarity_search(
        &self,
        query: &str,
        limit: usize,
        opt: &VecStoreOptions,
    ) -> Result<Vec<Document>, VectorStoreError> {
        let query_vector = self.embedder.embed_query(query).await?;
        let data = self.data.read().map_err(|e| e.to_string())?;
        let score_threshold = opt
            .score_threshold
            .map(f64::from)
            .unwrap_or(f64::NEG_INFINITY);
        let filter_map = opt.filters.as_ref().and_then(|v| v.as_object());

        let mut scored: Vec<(f64, &Document)> = data
            .iter()
            .filter(|entry| {
                filter_map.map_or(true, |m| metadata_matches(&entry.document.metadata, m))
            })
            .map(|entry| {
                (
                    cosine_similarity_f64(&query_vector, &entry.embedding),
                    &entry.document,
                )
            })
            .filter(|(s, _)| *s >= score_threshold)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, doc)| doc.clone().with_score(score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::embedding::MockEmbedder;

    fn docs() -> Vec<Document> {
        vec![
            Document::new("LangSmith traces and evaluates LLM applications")
                .with_metadata(HashMap::from([("section".to_string(), json!("tracing"))])),
            Document::new("zzz qqq xxx")
                .with_metadata(HashMap::from([("section".to_string(), json!("noise"))])),
            Document::new("Evaluate your LangSmith datasets")
                .with_metadata(HashMap::from([("section".to_string(), json!("evaluation"))])),
        ]
    }

    #[tokio::test]
    async fn test_similarity_search_orders_by_score() {
        let store = StoreBuilder::new().embedder(MockEmbedder).build().unwrap();
        let ids = store
            .add_documents(&docs(), &VecStoreOptions::default())
            .await
            .unwrap();
        assert_eq!(ids.len(), 3);

        let results = store
            .similarity_search("LangSmith tracing", 2, &VecStoreOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert!(results.iter().all(|d| d.page_content != "zzz qqq xxx"));
    }

    #[tokio::test]
    async fn test_filters_and_threshold() {
        let store = StoreBuilder::new().embedder(MockEmbedder).build().unwrap();
        store
            .add_documents(&docs(), &VecStoreOptions::default())
            .await
            .unwrap();

        let filtered = store
            .similarity_search(
                "LangSmith",
                4,
                &VecStoreOptions::new().with_filters(json!({"section": "evaluation"})),
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].page_content, "Evaluate your LangSmith datasets");

        let none = store
            .similarity_search("LangSmith", 4, &VecStoreOptions::new().with_score_threshold(1.1))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index").join("store.json");

        let store = StoreBuilder::new().embedder(MockEmbedder).build().unwrap();
        store
            .add_documents(&docs(), &VecStoreOptions::default())
            .await
            .unwrap();
        store.save(&path, &json!({"source": "docs"})).unwrap();

        let (meta, restored): (Value, Store) = Store::load(&path, Arc::new(MockEmbedder)).unwrap();
        assert_eq!(meta, json!({"source": "docs"}));
        assert_eq!(restored.len(), 3);
        let ids = restored
            .add_documents(&[Document::new("new")], &VecStoreOptions::default())
            .await
            .unwrap();
        assert_eq!(ids, vec!["inmem-3".to_string()]);
    }
}
