//! Small helpers shared across modules.

pub mod similarity;
pub mod text;

pub use similarity::*;
pub use text::*;
