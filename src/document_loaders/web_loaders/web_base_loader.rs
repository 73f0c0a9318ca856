use std::{collections::HashMap, time::Duration};

use async_stream::stream;
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, ClientBuilder};
use serde_json::Value;
use url::Url;

use crate::{
    document_loaders::{process_doc_stream, DocumentStream, Loader, LoaderError},
    schemas::Document,
    text_splitter::TextSplitter,
};

const DEFAULT_USER_AGENT: &str = concat!("langchain-chatbot/", env!("CARGO_PKG_VERSION"));

/// WebBaseLoader loads a single web page as one document.
///
/// The page is fetched with reqwest and reduced to its readable text with
/// readability. Metadata carries `source`, `title` and `source_type`.
#[derive(Debug, Clone)]
pub struct WebBaseLoader {
    url: Url,
    headers: Option<HeaderMap>,
    timeout: Option<Duration>,
}

impl WebBaseLoader {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: None,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    pub fn from_url_str<S: AsRef<str>>(url_str: S) -> Result<Self, LoaderError> {
        Ok(Self::new(Url::parse(url_str.as_ref())?))
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn build_client(&self) -> Result<Client, LoaderError> {
        let mut builder = ClientBuilder::new().user_agent(DEFAULT_USER_AGENT);
        if let Some(ref headers) = self.headers {
            builder = builder.default_headers(headers.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|source| LoaderError::FetchError {
            url: self.url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Loader for WebBaseLoader {
    async fn load(self) -> Result<DocumentStream, LoaderError> {
        let client = self.build_client()?;
        let url = self.url;

        let stream = stream! {
            log::info!("Fetching {}", url);
            let response = match client.get(url.as_str()).send().await {
                Ok(response) => response,
                Err(source) => {
                    yield Err(LoaderError::FetchError { url: url.to_string(), source });
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                yield Err(LoaderError::HttpStatus { url: url.to_string(), status });
                return;
            }

            let html = match response.text().await {
                Ok(html) => html,
                Err(source) => {
                    yield Err(LoaderError::FetchError { url: url.to_string(), source });
                    return;
                }
            };

            let mut html_reader = html.as_bytes();
            let cleaned = match readability::extractor::extract(&mut html_reader, &url) {
                Ok(product) => product,
                Err(e) => {
                    yield Err(LoaderError::ReadabilityError(e));
                    return;
                }
            };

            let content = format!("{}\n{}", cleaned.title, cleaned.text.trim());

            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), Value::from(url.as_str()));
            metadata.insert("source_type".to_string(), Value::from("web"));
            metadata.insert("title".to_string(), Value::from(cleaned.title));

            yield Ok(Document::new(content).with_metadata(metadata));
        };

        Ok(Box::pin(stream))
    }

    async fn load_and_split<TS: TextSplitter + 'static>(
        self,
        splitter: TS,
    ) -> Result<DocumentStream, LoaderError> {
        let doc_stream = self.load().await?;
        let stream = process_doc_stream(doc_stream, splitter).await;
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::text_splitter::{RecursiveCharacterTextSplitter, RecursiveCharacterTextSplitterOptions};

    const PAGE: &str = r#"<html>
<head><title>Get started with LangSmith</title></head>
<body>
<article>
<p>LangSmith is a platform for building production-grade LLM applications, letting you closely monitor and evaluate your application.</p>
<p>It lets you debug, test, evaluate, and monitor chains and intelligent agents built on any LLM framework.</p>
</article>
</body>
</html>"#;

    #[tokio::test]
    async fn test_web_base_loader() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .create_async()
            .await;

        let documents = WebBaseLoader::from_url_str(format!("{}/", server.url()))
            .unwrap()
            .load()
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;

        mock.assert_async().await;
        assert_eq!(documents.len(), 1);
        let doc = documents[0].as_ref().unwrap();
        assert!(doc.page_content.starts_with("Get started with LangSmith"));
        assert!(doc.page_content.contains("LangSmith is a platform"));
        assert_eq!(doc.metadata_str("title"), Some("Get started with LangSmith"));
        assert_eq!(doc.metadata_str("source_type"), Some("web"));
    }

    #[tokio::test]
    async fn test_load_and_split_yields_chunks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body(PAGE)
            .create_async()
            .await;

        let splitter = RecursiveCharacterTextSplitter::new(
            RecursiveCharacterTextSplitterOptions::new()
                .with_chunk_size(80)
                .with_chunk_overlap(10),
        );
        let chunks = WebBaseLoader::from_url_str(format!("{}/", server.url()))
            .unwrap()
            .load_and_split(splitter)
            .await
            .unwrap()
            .map(|d| d.unwrap())
            .collect::<Vec<_>>()
            .await;

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.page_content.chars().count() <= 80));
        assert!(chunks
            .iter()
            .all(|c| c.metadata_str("source").is_some_and(|s| s.starts_with(&server.url()))));
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let results = WebBaseLoader::from_url_str(format!("{}/missing", server.url()))
            .unwrap()
            .load()
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;

        assert!(matches!(
            results[0],
            Err(LoaderError::HttpStatus { status, .. }) if status.as_u16() == 404
        ));
    }
}
