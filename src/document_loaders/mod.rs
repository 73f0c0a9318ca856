mod document_loader;
pub use document_loader::*;

mod error;
pub use error::*;

pub mod web_loaders;
pub use web_loaders::*;
