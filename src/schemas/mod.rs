pub mod agent;
pub use agent::*;

mod document;
pub use document::*;

pub mod messages;
pub use messages::*;

mod retrievers;
pub use retrievers::*;

mod tools_openai_like;
pub use tools_openai_like::*;
