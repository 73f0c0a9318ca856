pub mod embedder_trait;
pub use embedder_trait::*;

mod error;
pub use error::*;

pub mod openai;
pub use openai::*;

pub mod mock;
pub use mock::*;
