//! # langchain-chatbot
//!
//! A research chatbot built the LangChain way: an OpenAI tools agent that can
//! look things up on Wikipedia, search arXiv, and run similarity search over
//! the LangSmith documentation, served behind a one-question web page.
//!
//! ## Overview
//!
//! - **Agent**: OpenAI tool-calling agent and its executor loop
//! - **Tools**: `wikipedia`, `arxiv_search` and `langsmith_search`
//! - **Retrievers**: Wikipedia, arXiv and a lazily built web page index
//! - **Indexing**: web loader, recursive character splitter, embeddings, in-memory vector store
//! - **Prompt**: chat prompt templates and the LangChain prompt hub client
//! - **Server**: axum web UI and JSON endpoint
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use langchain_chatbot::{chatbot::Chatbot, config::Settings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::new()?;
//! let chatbot = Arc::new(Chatbot::from_settings(&settings).await?);
//! if let Some(response) = chatbot.ask("What is LangSmith?").await? {
//!     println!("{}", response.output);
//! }
//! # Ok(()) }
//! ```

/// OpenAI tools agent and executor.
pub mod agent;
/// Tool, agent and index wiring plus the single-turn question loop.
pub mod chatbot;
/// Settings from the environment and `.env`.
pub mod config;
/// Web page loader.
pub mod document_loaders;
/// Embedding models.
pub mod embedding;
/// Unified error type.
pub mod error;
/// Common LLM trait, options and results.
pub mod language_models;
/// LLM implementations: OpenAI and a scripted mock.
pub mod llm;
/// Chat prompt templates and the prompt hub.
pub mod prompt;
/// Wikipedia, arXiv, vector store and web page index retrievers.
pub mod retrievers;
/// Messages, documents, tool calls and agent steps.
pub mod schemas;
/// axum web UI.
pub mod server;
/// Text splitters.
pub mod text_splitter;
/// Tools offered to the agent.
pub mod tools;
/// Similarity and text helpers.
pub mod utils;
/// Vector stores.
pub mod vectorstore;

pub use error::{ChatbotError, Result};
