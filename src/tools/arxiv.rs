use async_trait::async_trait;
use serde_json::Value;

use super::{query_from_input, Tool, ToolError};
use crate::{retrievers::ArxivRetriever, schemas::Retriever, utils::truncate_chars};

pub const NO_ARXIV_RESULT: &str = "No good Arxiv Result was found";

/// Searches arXiv and answers with `Published/Title/Authors/Summary` blocks,
/// cut to `doc_content_chars_max` characters.
pub struct ArxivQueryRun {
    retriever: ArxivRetriever,
    doc_content_chars_max: usize,
}

impl ArxivQueryRun {
    pub fn new(retriever: ArxivRetriever, doc_content_chars_max: usize) -> Self {
        Self {
            retriever,
            doc_content_chars_max,
        }
    }
}

impl Default for ArxivQueryRun {
    fn default() -> Self {
        Self::new(ArxivRetriever::new(), 4000)
    }
}

#[async_trait]
impl Tool for ArxivQueryRun {
    fn name(&self) -> String {
        "arxiv_search".to_string()
    }

    fn description(&self) -> String {
        "Search for academic papers on Arxiv.".to_string()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = query_from_input(&input)?;
        let docs = self.retriever.get_relevant_documents(&query).await?;
        if docs.is_empty() {
            return Ok(NO_ARXIV_RESULT.to_string());
        }

        let papers: Vec<String> = docs
            .iter()
            .map(|doc| {
                format!(
                    "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
                    doc.metadata_str("published").unwrap_or_default(),
                    doc.metadata_str("title").unwrap_or_default(),
                    doc.metadata_str("authors").unwrap_or_default(),
                    doc.page_content
                )
            })
            .collect();
        Ok(truncate_chars(&papers.join("\n\n"), self.doc_content_chars_max))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    const FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
<entry>
<id>http://arxiv.org/abs/2005.11401v4</id>
<updated>2021-04-12T15:42:17Z</updated>
<title>Retrieval-Augmented Generation for Knowledge-Intensive NLP Tasks</title>
<summary>Large pre-trained language models have been shown to store factual knowledge in their parameters.</summary>
<author><name>Patrick Lewis</name></author>
</entry>
</feed>"#;

    #[tokio::test]
    async fn test_formats_paper() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/query")
            .match_query(Matcher::Any)
            .with_body(FEED)
            .create_async()
            .await;

        let tool = ArxivQueryRun::new(
            ArxivRetriever::new()
                .with_api_url(format!("{}/api/query", server.url()))
                .with_max_docs(1),
            200,
        );
        let answer = tool.call("retrieval augmented generation").await.unwrap();

        assert!(answer.starts_with(
            "Published: 2021-04-12\nTitle: Retrieval-Augmented Generation for Knowledge-Intensive NLP Tasks\nAuthors: Patrick Lewis\nSummary: Large"
        ));
        assert!(answer.chars().count() <= 200);
    }

    #[tokio::test]
    async fn test_no_result_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/query")
            .match_query(Matcher::Any)
            .with_body(r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#)
            .create_async()
            .await;

        let tool = ArxivQueryRun::new(
            ArxivRetriever::new().with_api_url(format!("{}/api/query", server.url())),
            200,
        );
        assert_eq!(tool.call("nothing here").await.unwrap(), NO_ARXIV_RESULT);
    }
}
