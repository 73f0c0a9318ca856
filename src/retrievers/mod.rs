//! Retrievers module
//!
//! Every retriever implements [`crate::schemas::Retriever`]. The external ones
//! query public APIs per call; [`WebPageIndex`] embeds one page once and
//! serves similarity lookups over it.

mod error;
pub use error::*;

mod external;
pub use external::*;

mod vectorstore_retriever;
pub use vectorstore_retriever::*;

mod web_page_index;
pub use web_page_index::*;
