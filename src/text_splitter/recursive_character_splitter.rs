use std::collections::VecDeque;

use async_trait::async_trait;

use super::{TextSplitter, TextSplitterError};

/// Configuration for RecursiveCharacterTextSplitter
#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitterOptions {
    /// Maximum chunk size (in characters)
    pub chunk_size: usize,
    /// Overlap between chunks (in characters)
    pub chunk_overlap: usize,
    /// List of separators to try in order
    pub separators: Vec<String>,
    /// Whether to trim whitespace from chunks
    pub trim_chunks: bool,
}

impl Default for RecursiveCharacterTextSplitterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RecursiveCharacterTextSplitterOptions {
    pub fn new() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                "".to_string(),
            ],
            trim_chunks: true,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    pub fn with_trim_chunks(mut self, trim_chunks: bool) -> Self {
        self.trim_chunks = trim_chunks;
        self
    }

    fn validate(&self) -> Result<(), TextSplitterError> {
        if self.chunk_size == 0 {
            return Err(TextSplitterError::ZeroChunkSize);
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(TextSplitterError::InvalidSplitterOptions {
                chunk_size: self.chunk_size,
                chunk_overlap: self.chunk_overlap,
            });
        }
        Ok(())
    }
}

/// RecursiveCharacterTextSplitter splits text recursively by trying different separators.
///
/// The first separator present in the text is used to cut it into pieces, each
/// separator staying attached to the start of the piece that follows it. Pieces
/// that fit are merged greedily up to `chunk_size` characters, carrying up to
/// `chunk_overlap` characters of trailing pieces into the next chunk. Pieces that
/// are still too large are split again with the remaining separators.
///
/// Default separators: ["\n\n", "\n", " ", ""]
#[derive(Debug, Clone, Default)]
pub struct RecursiveCharacterTextSplitter {
    options: RecursiveCharacterTextSplitterOptions,
}

impl RecursiveCharacterTextSplitter {
    pub fn new(options: RecursiveCharacterTextSplitterOptions) -> Self {
        Self { options }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.options.chunk_size = chunk_size;
        self
    }

    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.options.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.options.separators = separators;
        self
    }

    pub fn options(&self) -> &RecursiveCharacterTextSplitterOptions {
        &self.options
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let splits = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for split in splits {
            if char_len(&split) < self.options.chunk_size {
                fitting.push(split);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge_splits(std::mem::take(&mut fitting)));
            }
            if remaining.is_empty() {
                chunks.push(split);
            } else {
                chunks.extend(self.split_recursive(&split, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge_splits(fitting));
        }
        chunks
    }

    fn merge_splits(&self, splits: Vec<String>) -> Vec<String> {
        let size = self.options.chunk_size;
        let overlap = self.options.chunk_overlap;

        let mut chunks = Vec::new();
        let mut current: VecDeque<String> = VecDeque::new();
        let mut total = 0;
        for split in splits {
            let len = char_len(&split);
            if total + len > size && !current.is_empty() {
                if total > size {
                    log::warn!("Created a chunk of size {total}, which is longer than the specified {size}");
                }
                if let Some(chunk) = self.join(&current) {
                    chunks.push(chunk);
                }
                while total > overlap || (total + len > size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(&front),
                        None => break,
                    }
                }
            }
            total += len;
            current.push_back(split);
        }
        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }
        chunks
    }

    fn join(&self, pieces: &VecDeque<String>) -> Option<String> {
        let joined: String = pieces.iter().map(String::as_str).collect();
        let joined = if self.options.trim_chunks {
            joined.trim().to_string()
        } else {
            joined
        };
        (!joined.is_empty()).then_some(joined)
    }
}

#[async_trait]
impl TextSplitter for RecursiveCharacterTextSplitter {
    async fn split_text(&self, text: &str) -> Result<Vec<String>, TextSplitterError> {
        self.options.validate()?;
        if text.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.split_recursive(text, &self.options.separators))
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First separator found in `text`, and the finer separators after it.
/// The empty separator always matches.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator, &separators[i + 1..]);
        }
    }
    match separators.last() {
        Some(last) => (last, &[]),
        None => ("", &[]),
    }
}

fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }
    pieces
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::Value;

    use super::*;
    use crate::schemas::Document;

    fn splitter(size: usize, overlap: usize) -> RecursiveCharacterTextSplitter {
        RecursiveCharacterTextSplitter::new(
            RecursiveCharacterTextSplitterOptions::new()
                .with_chunk_size(size)
                .with_chunk_overlap(overlap),
        )
    }

    #[tokio::test]
    async fn test_chunks_respect_size_and_overlap() {
        let text = (0..200)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = splitter(100, 20).split_text(&text).await.unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {chunk}");
        }
        for pair in chunks.windows(2) {
            let last_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(last_word),
                "{last_word} missing from next chunk"
            );
        }
        assert!(chunks[0].starts_with("word0 "));
        assert!(chunks.last().unwrap().ends_with("word199"));
    }

    #[tokio::test]
    async fn test_prefers_paragraph_boundaries() {
        let text = "First paragraph about agents.\n\nSecond paragraph about tracing.";
        let chunks = splitter(40, 0).split_text(text).await.unwrap();
        assert_eq!(
            chunks,
            vec![
                "First paragraph about agents.".to_string(),
                "Second paragraph about tracing.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_short_text_is_single_chunk() {
        let chunks = splitter(1000, 200)
            .split_text("LangSmith is a platform for LLM apps.")
            .await
            .unwrap();
        assert_eq!(chunks, vec!["LangSmith is a platform for LLM apps.".to_string()]);
    }

    #[tokio::test]
    async fn test_unbroken_text_falls_back_to_characters() {
        let text = "x".repeat(25);
        let chunks = splitter(10, 0).split_text(&text).await.unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[tokio::test]
    async fn test_empty_text() {
        assert!(splitter(100, 20).split_text("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlap_larger_than_size_is_rejected() {
        let err = splitter(10, 20).split_text("some text").await.unwrap_err();
        assert!(matches!(
            err,
            TextSplitterError::InvalidSplitterOptions { .. }
        ));
    }

    #[tokio::test]
    async fn test_split_documents_keeps_metadata() {
        let metadata = HashMap::from([(
            "source".to_string(),
            Value::from("https://docs.smith.langchain.com/"),
        )]);
        let doc = Document::new("alpha beta gamma delta epsilon").with_metadata(metadata);
        let docs = splitter(12, 0).split_documents(&[doc]).await.unwrap();

        assert!(docs.len() > 1);
        for doc in docs {
            assert_eq!(
                doc.metadata.get("source"),
                Some(&Value::from("https://docs.smith.langchain.com/"))
            );
        }
    }
}
