use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::{
    document_loaders::{Loader, WebBaseLoader},
    embedding::Embedder,
    retrievers::{RetrieverError, VectorStoreRetriever},
    schemas::{Document, Retriever},
    text_splitter::{RecursiveCharacterTextSplitter, RecursiveCharacterTextSplitterOptions},
    vectorstore::{
        in_memory::{Store, StoreBuilder},
        VecStoreOptions, VectorStore,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct WebPageIndexConfig {
    pub source_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Chunks returned per query.
    pub k: usize,
    /// JSON snapshot reused across restarts when present.
    pub cache_path: Option<PathBuf>,
}

impl Default for WebPageIndexConfig {
    fn default() -> Self {
        Self {
            source_url: "https://docs.smith.langchain.com/".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            k: 4,
            cache_path: None,
        }
    }
}

/// What an index cache was built from. A cache whose key differs from the
/// running configuration is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CacheKey {
    source_url: String,
    chunk_size: usize,
    chunk_overlap: usize,
    embedding_model: String,
}

/// Similarity index over the chunks of a single web page.
///
/// The page is fetched, split and embedded the first time the index is
/// queried or warmed, and at most once per process. Concurrent callers wait
/// for the same build, so no query ever sees a partially filled store. A
/// failed build is returned to every waiting caller and attempted again on
/// the next use.
pub struct WebPageIndex {
    config: WebPageIndexConfig,
    embedder: Arc<dyn Embedder>,
    retriever: OnceCell<VectorStoreRetriever<Store>>,
}

impl WebPageIndex {
    pub fn new(config: WebPageIndexConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            retriever: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &WebPageIndexConfig {
        &self.config
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey {
            source_url: self.config.source_url.clone(),
            chunk_size: self.config.chunk_size,
            chunk_overlap: self.config.chunk_overlap,
            embedding_model: self.embedder.model_id().to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.retriever.initialized()
    }

    /// Builds the index now instead of on the first query.
    pub async fn warm(&self) -> Result<(), RetrieverError> {
        self.retriever().await.map(|_| ())
    }

    /// Number of indexed chunks, or `None` before the index is built.
    pub fn chunk_count(&self) -> Option<usize> {
        self.retriever.get().map(|r| r.store().len())
    }

    async fn retriever(&self) -> Result<&VectorStoreRetriever<Store>, RetrieverError> {
        self.retriever
            .get_or_try_init(|| async {
                let store = self.build_store().await?;
                Ok::<_, RetrieverError>(VectorStoreRetriever::new(
                    Arc::new(store),
                    self.config.k,
                    VecStoreOptions::default(),
                ))
            })
            .await
    }

    async fn build_store(&self) -> Result<Store, RetrieverError> {
        if let Some(store) = self.load_cache() {
            return Ok(store);
        }

        log::info!("Indexing {}", self.config.source_url);
        let splitter = RecursiveCharacterTextSplitter::new(
            RecursiveCharacterTextSplitterOptions::new()
                .with_chunk_size(self.config.chunk_size)
                .with_chunk_overlap(self.config.chunk_overlap),
        );
        let chunks: Vec<Document> = WebBaseLoader::from_url_str(&self.config.source_url)?
            .load_and_split(splitter)
            .await?
            .try_collect()
            .await?;
        if chunks.is_empty() {
            return Err(RetrieverError::IndexBuildError(format!(
                "no text extracted from {}",
                self.config.source_url
            )));
        }

        let store = StoreBuilder::new()
            .shared_embedder(self.embedder.clone())
            .build()?;
        store
            .add_documents(&chunks, &VecStoreOptions::default())
            .await?;
        log::info!(
            "Indexed {} chunks from {}",
            chunks.len(),
            self.config.source_url
        );

        if let Some(path) = &self.config.cache_path {
            match store.save(path, &self.cache_key()) {
                Ok(()) => log::debug!("Saved index cache to {}", path.display()),
                Err(e) => log::warn!("Could not write index cache {}: {}", path.display(), e),
            }
        }
        Ok(store)
    }

    fn load_cache(&self) -> Option<Store> {
        let path = self.config.cache_path.as_ref().filter(|p| p.exists())?;
        match Store::load::<_, CacheKey>(path, self.embedder.clone()) {
            Ok((key, _)) if key != self.cache_key() => {
                log::warn!(
                    "Ignoring index cache {}: built from {} ({}/{} chunks, {}), rebuilding",
                    path.display(),
                    key.source_url,
                    key.chunk_size,
                    key.chunk_overlap,
                    key.embedding_model
                );
                None
            }
            Ok((_, store)) if !store.is_empty() => {
                log::info!(
                    "Loaded {} indexed chunks from cache {}",
                    store.len(),
                    path.display()
                );
                Some(store)
            }
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable index cache {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl Retriever for WebPageIndex {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        self.retriever().await?.get_relevant_documents(query).await
    }
}
