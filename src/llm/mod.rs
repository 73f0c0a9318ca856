pub mod openai;
pub use openai::*;

pub mod mock;
pub use mock::*;
