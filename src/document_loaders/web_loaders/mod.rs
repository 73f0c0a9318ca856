mod web_base_loader;
pub use web_base_loader::*;
