//! Architecture tests
//!
//! Tests to verify architectural patterns and module organization.

use std::sync::Arc;

use langchain_chatbot::{
    error::{AgentError, ChatbotError, ToolError},
    schemas::Retriever,
    tools::Tool,
};

#[test]
fn test_error_unification() {
    let error: ChatbotError = ToolError::ExecutionError("test".to_string()).into();
    match error {
        ChatbotError::ToolError(_) => {}
        _ => panic!("Expected ToolError variant"),
    }

    let error: ChatbotError = AgentError::NoTools.into();
    assert!(error.to_string().contains("at least one tool"));
}

#[test]
fn test_utils_similarity() {
    use langchain_chatbot::utils::cosine_similarity_f64;

    let similarity = cosine_similarity_f64(&[1.0, 0.0], &[1.0, 0.0]);
    assert!((similarity - 1.0).abs() < 1e-10);

    let similarity = cosine_similarity_f64(&[1.0, 0.0], &[0.0, 1.0]);
    assert!(similarity.abs() < 1e-10);
}

#[test]
fn test_trait_objects() {
    use langchain_chatbot::{
        retrievers::{WebPageIndex, WebPageIndexConfig},
        tools::create_retriever_tool,
        embedding::MockEmbedder,
    };

    let index: Arc<dyn Retriever> = Arc::new(WebPageIndex::new(
        WebPageIndexConfig::default(),
        Arc::new(MockEmbedder),
    ));
    let tool: Arc<dyn Tool> = Arc::new(create_retriever_tool(index, "docs", "Search the docs."));
    assert_eq!(tool.name(), "docs");
    assert_eq!(tool.parameters()["required"][0], "query");
}
