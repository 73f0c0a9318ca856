use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::retrievers::RetrieverError;
use crate::schemas::{Document, Retriever};
use crate::utils::truncate_chars;

/// Longest query the MediaWiki search endpoint is sent.
pub const WIKIPEDIA_MAX_QUERY_LENGTH: usize = 300;

/// Configuration for Wikipedia retriever
#[derive(Debug, Clone)]
pub struct WikipediaRetrieverConfig {
    /// MediaWiki API endpoint, e.g. `https://en.wikipedia.org/w/api.php`
    pub api_url: String,
    /// Maximum number of pages to load
    pub load_max_docs: usize,
    /// HTTP client timeout
    pub timeout: Option<std::time::Duration>,
}

impl Default for WikipediaRetrieverConfig {
    fn default() -> Self {
        Self {
            api_url: wikipedia_api_url("en"),
            load_max_docs: 3,
            timeout: Some(std::time::Duration::from_secs(30)),
        }
    }
}

pub fn wikipedia_api_url(language: &str) -> String {
    format!("https://{}.wikipedia.org/w/api.php", language)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    pageid: Option<u64>,
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: String,
}

/// Wikipedia retriever: a MediaWiki full-text search, then the plain-text
/// introduction of each hit.
#[derive(Debug, Clone)]
pub struct WikipediaRetriever {
    config: WikipediaRetrieverConfig,
    client: Client,
}

impl WikipediaRetriever {
    pub fn new() -> Self {
        Self::with_config(WikipediaRetrieverConfig::default())
    }

    pub fn with_config(config: WikipediaRetrieverConfig) -> Self {
        let mut client_builder = Client::builder();
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder.build().unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn with_api_url<S: Into<String>>(mut self, api_url: S) -> Self {
        self.config.api_url = api_url.into();
        self
    }

    pub fn with_max_docs(mut self, max_docs: usize) -> Self {
        self.config.load_max_docs = max_docs;
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, RetrieverError> {
        self.client
            .get(&self.config.api_url)
            .query(params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RetrieverError::WikipediaError(e.to_string()))?
            .json::<T>()
            .await
            .map_err(|e| RetrieverError::WikipediaError(e.to_string()))
    }

    /// Titles of the best matching pages.
    async fn search(&self, query: &str) -> Result<Vec<String>, RetrieverError> {
        let limit = self.config.load_max_docs.to_string();
        let response: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srprop", ""),
                ("srlimit", &limit),
                ("format", "json"),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<Document>, RetrieverError> {
        let response: ExtractResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(|p| !p.missing);
        let Some(page) = page else {
            log::debug!("Wikipedia page {title:?} not found, skipping");
            return Ok(None);
        };

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), Value::from("wikipedia"));
        metadata.insert("title".to_string(), Value::from(page.title));
        if let Some(id) = page.pageid {
            metadata.insert("page_id".to_string(), Value::from(id));
        }

        Ok(Some(
            Document::new(page.extract.trim().to_string()).with_metadata(metadata),
        ))
    }
}

impl Default for WikipediaRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for WikipediaRetriever {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        let query = truncate_chars(query, WIKIPEDIA_MAX_QUERY_LENGTH);
        let titles = self.search(&query).await?;

        let mut documents = Vec::new();
        for title in titles {
            if let Some(doc) = self.fetch_page(&title).await? {
                documents.push(doc);
            }
        }

        Ok(documents)
    }
}
