use async_trait::async_trait;
use serde_json::Value;

use super::{query_from_input, Tool, ToolError};
use crate::{
    retrievers::WikipediaRetriever,
    schemas::Retriever,
    utils::truncate_chars,
};

pub const NO_WIKIPEDIA_RESULT: &str = "No good Wikipedia Search Result was found";

/// Looks a query up on Wikipedia and answers with the page summaries.
///
/// Each hit becomes a `Page: <title>\nSummary: <intro>` block; blocks are
/// joined by a blank line and the whole answer is cut to
/// `doc_content_chars_max` characters.
pub struct WikipediaQueryRun {
    retriever: WikipediaRetriever,
    doc_content_chars_max: usize,
}

impl WikipediaQueryRun {
    pub fn new(retriever: WikipediaRetriever, doc_content_chars_max: usize) -> Self {
        Self {
            retriever,
            doc_content_chars_max,
        }
    }
}

impl Default for WikipediaQueryRun {
    fn default() -> Self {
        Self::new(WikipediaRetriever::new(), 4000)
    }
}

#[async_trait]
impl Tool for WikipediaQueryRun {
    fn name(&self) -> String {
        "wikipedia".to_string()
    }

    fn description(&self) -> String {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query.".to_string()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = query_from_input(&input)?;
        let docs = self.retriever.get_relevant_documents(&query).await?;

        let summaries: Vec<String> = docs
            .iter()
            .map(|doc| {
                format!(
                    "Page: {}\nSummary: {}",
                    doc.metadata_str("title").unwrap_or_default(),
                    doc.page_content
                )
            })
            .collect();
        if summaries.is_empty() {
            return Ok(NO_WIKIPEDIA_RESULT.to_string());
        }
        Ok(truncate_chars(
            &summaries.join("\n\n"),
            self.doc_content_chars_max,
        ))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_formats_and_truncates_summary() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("list".into(), "search".into()))
            .with_body(json!({"query": {"search": [{"title": "LangChain"}]}}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("prop".into(), "extracts".into()))
            .with_body(
                json!({"query": {"pages": [{
                    "pageid": 1,
                    "title": "LangChain",
                    "extract": "LangChain is a software framework that helps facilitate the integration of large language models into applications. ".repeat(4)
                }]}})
                .to_string(),
            )
            .create_async()
            .await;

        let tool = WikipediaQueryRun::new(
            WikipediaRetriever::new()
                .with_api_url(format!("{}/w/api.php", server.url()))
                .with_max_docs(1),
            200,
        );
        let answer = tool.call(r#"{"query": "LangChain"}"#).await.unwrap();

        assert!(answer.starts_with("Page: LangChain\nSummary: LangChain is a software framework"));
        assert_eq!(answer.chars().count(), 200);
    }

    #[tokio::test]
    async fn test_no_result_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_body(json!({"query": {"search": []}}).to_string())
            .create_async()
            .await;

        let tool = WikipediaQueryRun::new(
            WikipediaRetriever::new().with_api_url(format!("{}/w/api.php", server.url())),
            200,
        );
        assert_eq!(tool.call("qwzxv").await.unwrap(), NO_WIKIPEDIA_RESULT);
    }
}
