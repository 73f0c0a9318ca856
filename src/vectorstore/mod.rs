mod error;
mod options;
mod vectorstore;

pub mod in_memory;

pub use error::*;
pub use options::*;
pub use vectorstore::*;
