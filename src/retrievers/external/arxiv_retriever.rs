use std::collections::HashMap;

use async_trait::async_trait;
use quick_xml::{events::Event, Reader};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::retrievers::RetrieverError;
use crate::schemas::{Document, Retriever};
use crate::utils::truncate_chars;

/// Longest query the arXiv API is sent.
pub const ARXIV_MAX_QUERY_LENGTH: usize = 300;

pub const DEFAULT_ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

const ARXIV_ID_PATTERN: &str = r"^(?:\d{2}(?:0[1-9]|1[0-2])\.\d{4,5}(?:v\d+)?|\d{7}.*)$";

/// Configuration for arXiv retriever
#[derive(Debug, Clone)]
pub struct ArxivRetrieverConfig {
    /// Atom query endpoint
    pub api_url: String,
    /// Maximum number of documents to retrieve
    pub max_docs: usize,
    /// HTTP client timeout
    pub timeout: Option<std::time::Duration>,
}

impl Default for ArxivRetrieverConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ARXIV_API_URL.to_string(),
            max_docs: 3,
            timeout: Some(std::time::Duration::from_secs(30)),
        }
    }
}

/// arXiv retriever that fetches paper abstracts from the arXiv Atom API.
///
/// A query made only of arXiv identifiers (`1706.03762`, `2310.06825v2`, ...)
/// is looked up by id; anything else goes to full-text search.
#[derive(Debug, Clone)]
pub struct ArxivRetriever {
    config: ArxivRetrieverConfig,
    client: Client,
}

#[derive(Debug, Default)]
struct Entry {
    id: String,
    title: String,
    summary: String,
    updated: String,
    authors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Id,
    Title,
    Summary,
    Updated,
    AuthorName,
}

impl ArxivRetriever {
    pub fn new() -> Self {
        Self::with_config(ArxivRetrieverConfig::default())
    }

    pub fn with_config(config: ArxivRetrieverConfig) -> Self {
        let mut client_builder = Client::builder();
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder.build().unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn with_max_docs(mut self, max_docs: usize) -> Self {
        self.config.max_docs = max_docs;
        self
    }

    pub fn with_api_url<S: Into<String>>(mut self, api_url: S) -> Self {
        self.config.api_url = api_url.into();
        self
    }

    /// True when every whitespace-separated token of `query` is an arXiv id.
    pub fn is_arxiv_identifier(query: &str) -> bool {
        let Ok(re) = Regex::new(ARXIV_ID_PATTERN) else {
            return false;
        };
        let mut tokens = query.split_whitespace().peekable();
        tokens.peek().is_some() && tokens.all(|t| re.is_match(t))
    }

    async fn search_arxiv(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        let query = truncate_chars(query, ARXIV_MAX_QUERY_LENGTH);
        let max_results = self.config.max_docs.to_string();

        let mut request = self.client.get(&self.config.api_url);
        if Self::is_arxiv_identifier(&query) {
            let ids = query.split_whitespace().collect::<Vec<_>>().join(",");
            request = request.query(&[("id_list", ids.as_str()), ("max_results", &max_results)]);
        } else {
            request = request.query(&[
                ("search_query", query.as_str()),
                ("start", "0"),
                ("max_results", &max_results),
            ]);
        }

        let xml_content = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RetrieverError::ArxivError(e.to_string()))?
            .text()
            .await
            .map_err(|e| RetrieverError::ArxivError(e.to_string()))?;

        let entries = parse_feed(&xml_content)?;
        Ok(entries.into_iter().map(Entry::into_document).collect())
    }
}

impl Entry {
    fn into_document(self) -> Document {
        let published = self.updated.get(..10).unwrap_or(&self.updated).to_string();
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), Value::from("arxiv"));
        metadata.insert("entry_id".to_string(), Value::from(self.id));
        metadata.insert("published".to_string(), Value::from(published));
        metadata.insert("title".to_string(), Value::from(self.title));
        metadata.insert("authors".to_string(), Value::from(self.authors.join(", ")));
        Document::new(self.summary).with_metadata(metadata)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_feed(xml: &str) -> Result<Vec<Entry>, RetrieverError> {
    let xml_error = |e: quick_xml::Error| RetrieverError::ArxivError(format!("invalid Atom feed: {e}"));

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<Entry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => current = Some(Entry::default()),
                b"id" if current.is_some() => field = Some(Field::Id),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"summary" if current.is_some() => field = Some(Field::Summary),
                b"updated" if current.is_some() => field = Some(Field::Updated),
                b"name" if current.is_some() => field = Some(Field::AuthorName),
                _ => {}
            },
            Event::Text(t) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    let text = t.unescape().map_err(xml_error)?;
                    match field {
                        Field::Id => entry.id.push_str(&text),
                        Field::Title => entry.title.push_str(&text),
                        Field::Summary => entry.summary.push_str(&text),
                        Field::Updated => entry.updated.push_str(&text),
                        Field::AuthorName => entry.authors.push(text.into_owned()),
                    }
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"entry" {
                    if let Some(mut entry) = current.take() {
                        if entry.id.contains("/api/errors") {
                            return Err(RetrieverError::ArxivError(entry.summary));
                        }
                        entry.title = collapse_whitespace(&entry.title);
                        entry.summary = entry.summary.trim().to_string();
                        entries.push(entry);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

impl Default for ArxivRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for ArxivRetriever {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        self.search_arxiv(query).await
    }
}
