use serde_json::Value;

/// Per-call options for vector store operations.
///
/// `filters` is a JSON object; a document matches when every key is present
/// in its metadata with an equal value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VecStoreOptions {
    pub score_threshold: Option<f32>,
    pub filters: Option<Value>,
}

impl VecStoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = Some(score_threshold);
        self
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }
}
