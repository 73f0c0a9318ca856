//! External index retrievers
//!
//! These retrievers fetch documents from Wikipedia and arXiv.

mod wikipedia_retriever;
pub use wikipedia_retriever::*;

mod arxiv_retriever;
pub use arxiv_retriever::*;
