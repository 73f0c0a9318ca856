mod error;
mod recursive_character_splitter;
mod text_splitter;

pub use error::*;
pub use recursive_character_splitter::*;
pub use text_splitter::*;
