mod tool;
pub use tool::*;

mod error;
pub use error::*;

mod wikipedia;
pub use wikipedia::*;

mod arxiv;
pub use arxiv::*;

mod retriever_tool;
pub use retriever_tool::*;
